//! Registry of code generation targets.

use crate::traits::Backend;
use std::sync::OnceLock;

/// Built-in backends, in registration order.
static BACKENDS: OnceLock<Vec<&'static dyn Backend>> = OnceLock::new();

/// A target name no backend answers to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported target `{name}` (expected one of: {choices})")]
pub struct UnsupportedTarget {
    pub name: String,
    pub choices: String,
}

fn builtin() -> &'static [&'static dyn Backend] {
    BACKENDS.get_or_init(|| {
        #[allow(unused_mut)]
        let mut backends: Vec<&'static dyn Backend> = Vec::new();

        #[cfg(feature = "backend-go")]
        {
            backends.push(&crate::output::go::GO_BACKEND);
        }

        #[cfg(feature = "backend-moonbit")]
        {
            backends.push(&crate::output::moonbit::MOONBIT_BACKEND);
        }

        backends
    })
}

/// Look up a backend by canonical name or alias. Matching is case-sensitive.
pub fn backend(name: &str) -> Result<&'static dyn Backend, UnsupportedTarget> {
    builtin()
        .iter()
        .find(|b| b.name() == name || b.aliases().contains(&name))
        .copied()
        .ok_or_else(|| UnsupportedTarget {
            name: name.to_string(),
            choices: builtin()
                .iter()
                .flat_map(|b| std::iter::once(b.name()).chain(b.aliases().iter().copied()))
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// List all registered backends.
pub fn backends() -> &'static [&'static dyn Backend] {
    builtin()
}

/// List canonical backend names.
pub fn backend_names() -> Vec<&'static str> {
    builtin().iter().map(|b| b.name()).collect()
}
