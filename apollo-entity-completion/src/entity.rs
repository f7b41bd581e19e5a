use crate::graphql::Error;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::origin::Origin;

pub(crate) const TYPENAME_FIELD: &str = "__typename";

/// A composite value resolved by one origin, along with what that origin reported about it.
///
/// The errors and origin are annotations: they never show up in [`Entity::data`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    pub data: Object,
    errors: Vec<Error>,
    origin: Option<Origin>,
}

impl Entity {
    pub fn new(data: Object) -> Self {
        Self {
            data,
            errors: Vec::new(),
            origin: None,
        }
    }

    /// The concrete type name the origin reported, if any.
    pub fn typename(&self) -> Option<&str> {
        self.data.get(TYPENAME_FIELD).and_then(Value::as_str)
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// The origin that produced this entity.
    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// Replaces the errors attached to this entity.
    pub fn set_errors(&mut self, errors: Vec<Error>) {
        self.errors = errors;
    }

    /// Replaces the origin recorded for this entity.
    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = Some(origin);
    }
}

impl From<Object> for Entity {
    fn from(data: Object) -> Self {
        Self::new(data)
    }
}
