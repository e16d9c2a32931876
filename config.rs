//! Session configuration.
//!
//! `AnalyzerConfig` is `serde`-deserializable so it can be loaded from a TOML
//! file the same way `navicore-cem3` loads its runtime config, and is also
//! the shape the CLI's `clap` arguments fill in directly.

use serde::{Deserialize, Serialize};

/// Which numerical domain backend to use for a session. Fixed for the
/// lifetime of the session once chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Intervals,
    Octagons,
    /// Convex polyhedra are not implemented (see DESIGN.md); this maps to
    /// the octagon backend, the most relational domain this crate has.
    Polyhedra,
}

impl Default for DomainKind {
    fn default() -> Self {
        DomainKind::Intervals
    }
}

/// The unrolling delay `U`: widen only every `U`th visit of a back-edge tail.
pub const DEFAULT_UNROLLING_DELAY: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub domain: DomainKind,
    #[serde(default = "default_unrolling_delay")]
    pub unrolling_delay: u32,
    /// `:`-separated, passed verbatim to the (absent) C front end. Accepted
    /// for interface compatibility; this crate has no C front end to hand
    /// it to, so it is otherwise unused.
    #[serde(default)]
    pub header_search_path: Option<String>,
}

fn default_unrolling_delay() -> u32 {
    DEFAULT_UNROLLING_DELAY
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            domain: DomainKind::default(),
            unrolling_delay: DEFAULT_UNROLLING_DELAY,
            header_search_path: None,
        }
    }
}
