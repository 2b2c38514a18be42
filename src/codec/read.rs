//! Scalar/object-vs-array acceptance on decode.

use crate::config::GlobalFeatureState;
use crate::error::BindError;
use crate::feature::FeatureFlag;
use crate::path::PropertyPath;
use crate::schema::SequenceProperty;
use crate::value::Sequence;

use super::{ElementBinder, TokenKind};

/// Terminal states of a sequence-property bind.
///
/// A bind waits for the property's token and then takes exactly one
/// transition, [`ReadState::transition`], into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Token is null: the sequence is absent.
    Absent,
    /// Token is an array: bind each element.
    BindingSequence,
    /// Token is a bare scalar or object accepted as one element.
    BindingSingleton,
    /// Token is a bare scalar or object and single values are refused.
    Failed,
}

impl ReadState {
    /// The state reached from `token`.
    ///
    /// `accept_single` is only consulted for scalar and object tokens.
    #[must_use]
    pub const fn transition(token: TokenKind, accept_single: bool) -> Self {
        match token {
            TokenKind::Null => Self::Absent,
            TokenKind::Array => Self::BindingSequence,
            TokenKind::Bool | TokenKind::Number | TokenKind::String | TokenKind::Object => {
                if accept_single {
                    Self::BindingSingleton
                } else {
                    Self::Failed
                }
            }
        }
    }
}

/// Binds sequence-valued properties, wrapping a bare scalar or object into
/// a one-element sequence when the accept feature is effective.
#[derive(Debug, Clone, Copy)]
pub struct SequenceReadCoercer {
    global: GlobalFeatureState,
}

impl SequenceReadCoercer {
    /// Creates a coercer over the reader's global feature state.
    #[must_use]
    pub const fn new(global: GlobalFeatureState) -> Self {
        Self { global }
    }

    /// Binds `token` for `property`.
    ///
    /// Returns `Ok(None)` for a null token.
    ///
    /// # Errors
    /// - `TypeMismatch` if the token is a bare scalar or object and the
    ///   accept feature is not effective for the property
    /// - any element bind error, unchanged
    pub fn read<B>(
        &self,
        property: SequenceProperty<'_>,
        token: &serde_json::Value,
        path: &PropertyPath,
        binder: &B,
    ) -> Result<Option<Sequence>, BindError>
    where
        B: ElementBinder + ?Sized,
    {
        let kind = TokenKind::of(token);
        let accept = property.effective(FeatureFlag::AcceptSingleValueAsSequence, &self.global);
        let element = property.element();

        match ReadState::transition(kind, accept) {
            ReadState::Absent => Ok(None),
            ReadState::BindingSequence => {
                let items = token.as_array().map(Vec::as_slice).unwrap_or_default();
                let elements = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| binder.bind_element(element, item, &path.index(i)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(Sequence::typed(property.kind(), element, elements)))
            }
            ReadState::BindingSingleton => {
                tracing::debug!(
                    property = property.name(),
                    token = %kind,
                    "accepting single value as sequence"
                );
                let value = binder.bind_element(element, token, &path.index(0))?;
                Ok(Some(Sequence::typed(property.kind(), element, vec![value])))
            }
            ReadState::Failed => {
                tracing::debug!(
                    property = property.name(),
                    token = %kind,
                    "single value refused for sequence"
                );
                Err(BindError::TypeMismatch {
                    path: path.clone(),
                    expected: property.kind(),
                    actual: kind,
                })
            }
        }
    }
}
