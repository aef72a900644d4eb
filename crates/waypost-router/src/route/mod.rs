/// Route module: declaration, segment classification and flattening
///
/// Contains the author-facing tree ([`spec`]), the pure segment parser
/// ([`pattern`]) and the one-shot tree walk that produces the lookup table
/// ([`flatten`]).

use std::collections::HashMap;

pub mod flatten;
pub mod pattern;
pub mod spec;

// Re-export commonly used types
pub use flatten::{FlatLayout, FlatRoute, LayoutId, RouteTable, UidGenerator};
pub use pattern::{classify_segment, param_names, PatternSegment};
pub use spec::{Component, ComponentLoader, LayoutSpec, PageSpec, RouteSpec};

/// Path parameter values keyed by parameter name (without the `:`)
pub type Params = HashMap<String, String>;

/// Props handed to components; merged shallowly, later writers win
pub type Props = serde_json::Map<String, serde_json::Value>;
