//! Minimal `{{.Name}}` templates filled from a [`StatsSnapshot`].

use crate::error::{Error, Result};
use crate::stats::{StatsSnapshot, humanize_bytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatField {
    TotalRam,
    UsedRam,
    FreeRam,
    TotalSwap,
    UsedSwap,
    FreeSwap,
    CpuUser,
    CpuSystem,
    CpuIdle,
}

impl StatField {
    const ALL: &'static [(&'static str, Self)] = &[
        ("TotalRam", Self::TotalRam),
        ("UsedRam", Self::UsedRam),
        ("FreeRam", Self::FreeRam),
        ("TotalSwap", Self::TotalSwap),
        ("UsedSwap", Self::UsedSwap),
        ("FreeSwap", Self::FreeSwap),
        ("CpuUser", Self::CpuUser),
        ("CpuSystem", Self::CpuSystem),
        ("CpuIdle", Self::CpuIdle),
    ];

    fn lookup(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    fn render(self, stats: &StatsSnapshot) -> String {
        let m = &stats.memory;
        match self {
            Self::TotalRam => humanize_bytes(m.ram_total),
            Self::UsedRam => humanize_bytes(m.ram_used),
            Self::FreeRam => humanize_bytes(m.ram_free),
            Self::TotalSwap => humanize_bytes(m.swap_total),
            Self::UsedSwap => humanize_bytes(m.swap_used),
            Self::FreeSwap => humanize_bytes(m.swap_free),
            Self::CpuUser => stats.cpu_user_pct.to_string(),
            Self::CpuSystem => stats.cpu_system_pct.to_string(),
            Self::CpuIdle => stats.cpu_idle_pct.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(StatField),
}

/// A compiled template. Parse once, render every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// # Errors
    /// [`Error::Format`] for an unterminated action or an unknown field name.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| Error::Format(format!("unterminated action in template {source:?}")))?;
            let action = after[..end].trim();
            let name = action.strip_prefix('.').ok_or_else(|| {
                Error::Format(format!("unsupported action {{{{{action}}}}} in template {source:?}"))
            })?;
            let field = StatField::lookup(name)
                .ok_or_else(|| Error::Format(format!("unknown field {name:?} in template {source:?}")))?;
            segments.push(Segment::Field(field));
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn render(&self, stats: &StatsSnapshot) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(&field.render(stats)),
            }
        }
        out
    }
}
