use std::fmt;
use std::sync::Arc;

use intercede_invocation::MethodInfo;

type Matcher = dyn Fn(&MethodInfo) -> bool + Send + Sync;

/// Selects the methods an advice applies to.
///
/// The default predicate accepts every method whose declaring type is not the
/// universal base object type. It looks at the type that declares the called
/// slot, not at the runtime receiver, so `hash_code` is only selected on types
/// that override it.
#[derive(Clone)]
pub struct MethodPredicate {
	matcher: Arc<Matcher>,
	describe: &'static str,
}

impl MethodPredicate {
	pub fn new<F>(matcher: F) -> Self
	where
		F: Fn(&MethodInfo) -> bool + Send + Sync + 'static,
	{
		Self {
			matcher: Arc::new(matcher),
			describe: "custom",
		}
	}

	/// Accepts every method, including those declared on the base object type.
	pub fn all() -> Self {
		Self {
			matcher: Arc::new(|_| true),
			describe: "all",
		}
	}

	pub fn none() -> Self {
		Self {
			matcher: Arc::new(|_| false),
			describe: "none",
		}
	}

	/// Accepts methods whose name starts with `prefix`.
	pub fn named_prefix(prefix: impl Into<String>) -> Self {
		let prefix = prefix.into();
		Self {
			matcher: Arc::new(move |method| method.name().starts_with(prefix.as_str())),
			describe: "named_prefix",
		}
	}

	pub fn matches(&self, method: &MethodInfo) -> bool {
		(self.matcher)(method)
	}
}

impl Default for MethodPredicate {
	fn default() -> Self {
		Self {
			matcher: Arc::new(|method| !method.declaring_type().is_object()),
			describe: "default",
		}
	}
}

impl fmt::Debug for MethodPredicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "MethodPredicate({})", self.describe)
	}
}
