//! Reversible projections between an enum and one of its variants.

use std::sync::Arc;

/// Embeds a `Value` into a `Root` (always succeeds) and extracts it back (only when the
/// root is that case). Usually built with [`case_path!`](crate::case_path).
pub struct CasePath<Root, Value> {
    embed: Arc<dyn Fn(Value) -> Root + Send + Sync>,
    extract: Arc<dyn Fn(&Root) -> Option<Value> + Send + Sync>,
}

impl<Root, Value> Clone for CasePath<Root, Value> {
    fn clone(&self) -> Self {
        CasePath {
            embed: self.embed.clone(),
            extract: self.extract.clone(),
        }
    }
}

impl<Root, Value> CasePath<Root, Value> {
    pub fn new<E, X>(embed: E, extract: X) -> Self
    where
        E: Fn(Value) -> Root + Send + Sync + 'static,
        X: Fn(&Root) -> Option<Value> + Send + Sync + 'static,
    {
        CasePath {
            embed: Arc::new(embed),
            extract: Arc::new(extract),
        }
    }

    pub fn embed(&self, value: Value) -> Root {
        (self.embed)(value)
    }

    pub fn extract(&self, root: &Root) -> Option<Value> {
        (self.extract)(root)
    }

    /// Chain through a nested enum: `Root -> Value -> Leaf`.
    pub fn appending<Leaf>(self, inner: CasePath<Value, Leaf>) -> CasePath<Root, Leaf>
    where
        Root: 'static,
        Value: 'static,
        Leaf: 'static,
    {
        let outer = self.clone();
        let inner_extract = inner.clone();
        CasePath::new(
            move |leaf| self.embed(inner.embed(leaf)),
            move |root| outer.extract(root).and_then(|v| inner_extract.extract(&v)),
        )
    }
}

/// Build a [`CasePath`] for one enum variant.
///
/// ```
/// use web_utils::case_path;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Route {
///     List,
///     Show(i64),
///     Rename { id: i64, name: String },
/// }
///
/// let list = case_path!(Route::List);
/// let show = case_path!(Route::Show(id));
/// let rename = case_path!(Route::Rename { id, name });
///
/// assert_eq!(list.embed(()), Route::List);
/// assert_eq!(show.extract(&Route::Show(4)), Some(4));
/// assert_eq!(show.extract(&Route::List), None);
/// assert_eq!(
///     rename.embed((1, "a".to_string())),
///     Route::Rename { id: 1, name: "a".to_string() }
/// );
/// ```
///
/// Unit variants project to `()`, single-field variants to the field, and variants with
/// several fields to a tuple in declaration order. Fields must be `Clone`.
#[macro_export]
macro_rules! case_path {
    ($($seg:ident)::+ ( $field:ident )) => {
        $crate::router::CasePath::new(
            |$field| $($seg)::+($field),
            |root| {
                #[allow(unreachable_patterns)]
                let value = match root {
                    $($seg)::+($field) => ::core::option::Option::Some(::core::clone::Clone::clone($field)),
                    _ => ::core::option::Option::None,
                };
                value
            },
        )
    };
    ($($seg:ident)::+ ( $($field:ident),+ )) => {
        $crate::router::CasePath::new(
            |($($field),+)| $($seg)::+($($field),+),
            |root| {
                #[allow(unreachable_patterns)]
                let value = match root {
                    $($seg)::+($($field),+) => ::core::option::Option::Some(($(::core::clone::Clone::clone($field)),+)),
                    _ => ::core::option::Option::None,
                };
                value
            },
        )
    };
    ($($seg:ident)::+ { $field:ident }) => {
        $crate::router::CasePath::new(
            |$field| $($seg)::+ { $field },
            |root| {
                #[allow(unreachable_patterns)]
                let value = match root {
                    $($seg)::+ { $field } => ::core::option::Option::Some(::core::clone::Clone::clone($field)),
                    _ => ::core::option::Option::None,
                };
                value
            },
        )
    };
    ($($seg:ident)::+ { $($field:ident),+ }) => {
        $crate::router::CasePath::new(
            |($($field),+)| $($seg)::+ { $($field),+ },
            |root| {
                #[allow(unreachable_patterns)]
                let value = match root {
                    $($seg)::+ { $($field),+ } => ::core::option::Option::Some(($(::core::clone::Clone::clone($field)),+)),
                    _ => ::core::option::Option::None,
                };
                value
            },
        )
    };
    ($($seg:ident)::+) => {
        $crate::router::CasePath::new(
            |()| $($seg)::+,
            |root| {
                #[allow(unreachable_patterns)]
                let value = match root {
                    $($seg)::+ => ::core::option::Option::Some(()),
                    _ => ::core::option::Option::None,
                };
                value
            },
        )
    };
}
