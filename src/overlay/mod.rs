//! Text overlays: format strings, stats templates and the ownership mask.

pub mod format;
pub mod mask;
pub mod template;

use crate::error::{Error, Result};
use crate::stats::StatsSnapshot;

pub use format::{ColorRule, OverlayDescriptor, parse_format};
pub use mask::{OverlayMask, build_mask};
pub use template::Template;

/// Alpha 0 marks "no overlay", so 254 owners fit alongside it with room to spare.
pub const MAX_OVERLAYS: usize = 254;

/// The configured overlays, parsed and compiled once at start-up.
#[derive(Debug, Clone)]
pub struct OverlaySet {
    entries: Vec<(OverlayDescriptor, Template)>,
}

impl OverlaySet {
    /// # Errors
    /// [`Error::Format`] for any malformed format string or template,
    /// [`Error::TooManyOverlays`] past [`MAX_OVERLAYS`].
    pub fn compile<S: AsRef<str>>(formats: &[S]) -> Result<Self> {
        if formats.len() > MAX_OVERLAYS {
            return Err(Error::TooManyOverlays(formats.len()));
        }
        let entries = formats
            .iter()
            .map(|raw| {
                let descriptor = parse_format(raw.as_ref())?;
                let template = Template::parse(&descriptor.template)?;
                Ok((descriptor, template))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh descriptors with their text rendered from `stats`.
    pub fn descriptors(&self, stats: &StatsSnapshot) -> Vec<OverlayDescriptor> {
        self.entries
            .iter()
            .map(|(descriptor, template)| OverlayDescriptor {
                rendered_text: template.render(stats),
                ..descriptor.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_and_render() {
        let set = OverlaySet::compile(&["X:1;Y:2;idle {{.CpuIdle}}%", "static"]).unwrap();
        assert_eq!(set.len(), 2);
        let stats = StatsSnapshot {
            cpu_idle_pct: 97,
            ..StatsSnapshot::default()
        };
        let d = set.descriptors(&stats);
        assert_eq!(d[0].rendered_text, "idle 97%");
        assert_eq!(d[0].template, "idle {{.CpuIdle}}%");
        assert_eq!((d[0].x, d[0].y), (1, 2));
        assert_eq!(d[1].rendered_text, "static");
    }

    #[test]
    fn compile_surfaces_template_errors() {
        assert!(matches!(OverlaySet::compile(&["{{.Nope}}"]), Err(Error::Format(_))));
        assert!(matches!(OverlaySet::compile(&["X:abc"]), Err(Error::Format(_))));
    }

    #[test]
    fn compile_limits_count() {
        let formats = vec!["x"; MAX_OVERLAYS + 1];
        assert!(matches!(OverlaySet::compile(formats.as_slice()), Err(Error::TooManyOverlays(_))));
    }
}
