//! Rule definitions
//!
//! Converters, hooks and walkers are all plain functions from the current record to an
//! optional replacement. `Ok(None)` means "no change at this step"; rules never mutate their
//! input.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::migration::Migration;
use crate::record::Record;
use crate::version::VersionKey;

/// A shared rule function
pub type RuleFn = Arc<dyn Fn(&Record, &Migration<'_>) -> Result<Option<Record>> + Send + Sync>;

/// Box a closure as a [`RuleFn`]
pub fn rule<F>(f: F) -> RuleFn
where
    F: Fn(&Record, &Migration<'_>) -> Result<Option<Record>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A whole-record transformation tied to one version
#[derive(Clone)]
pub struct Converter {
    version: VersionKey,
    transform: RuleFn,
}

impl Converter {
    pub fn new(version: VersionKey, transform: RuleFn) -> Self {
        Self { version, transform }
    }

    pub fn version(&self) -> VersionKey {
        self.version
    }

    pub fn transform(&self) -> &RuleFn {
        &self.transform
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").field("version", &self.version).finish()
    }
}

/// A pre/post interceptor bracketing every converter and the final walk
///
/// `pre` functions of a group run in registration order, `post` functions in reverse.
#[derive(Clone, Default)]
pub struct Hook {
    pre: Option<RuleFn>,
    post: Option<RuleFn>,
}

impl Hook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pre<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &Migration<'_>) -> Result<Option<Record>> + Send + Sync + 'static,
    {
        self.pre = Some(Arc::new(f));
        self
    }

    pub fn with_post<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &Migration<'_>) -> Result<Option<Record>> + Send + Sync + 'static,
    {
        self.post = Some(Arc::new(f));
        self
    }

    pub fn pre(&self) -> Option<&RuleFn> {
        self.pre.as_ref()
    }

    pub fn post(&self) -> Option<&RuleFn> {
        self.post.as_ref()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}
