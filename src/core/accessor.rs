//! Typed field accessors.
//!
//! A field is read off an item through a getter captured when the field is
//! mapped. Nested fields are reached through a chain of [`Hop`]s, each of
//! which may find its target absent on a given instance; the failing hop is
//! then reported as a [`ExportError::FieldResolution`].

use crate::error::{ExportError, ExportResult};

type HopFn<T, U> = Box<dyn for<'a> Fn(&'a T) -> Result<&'a U, usize>>;

type GetterFn<T, M> = Box<dyn Fn(&T) -> Result<M, usize>>;

// Pins the closure to a higher-ranked signature before it is boxed.
fn hop_fn<T, U, F>(f: F) -> F
where
    F: for<'a> Fn(&'a T) -> Result<&'a U, usize>,
{
    f
}

/// Extracts the value of one field of `T`, possibly through nested members.
///
/// # Examples
///
/// ```
/// use csv_export_engine::core::accessor::{Accessor, Hop};
///
/// struct Address { street: String }
/// struct Person { name: String, address: Option<Address> }
///
/// let name = Accessor::field("name", |p: &Person| p.name.clone());
/// let street = Hop::new("address", |p: &Person| p.address.as_ref())
///     .field("street", |a: &Address| a.street.clone());
///
/// let person = Person { name: "Tom".to_string(), address: None };
/// assert_eq!(name.resolve(&person).unwrap(), "Tom");
/// assert!(street.resolve(&person).is_err());
/// assert_eq!(street.path(), "address.street");
/// ```
pub struct Accessor<T, M> {
    path: Vec<String>,
    getter: GetterFn<T, M>,
}

impl<T: 'static, M: 'static> Accessor<T, M> {
    /// Creates an accessor for a field read directly off `T`.
    pub fn field<F>(name: &str, getter: F) -> Self
    where
        F: Fn(&T) -> M + 'static,
    {
        Accessor {
            path: vec![name.to_owned()],
            getter: Box::new(move |item: &T| Ok(getter(item))),
        }
    }
}

impl<T, M> Accessor<T, M> {
    /// Name of the innermost member, used as the field name.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Dotted member path from the outermost receiver to the field.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Reads the field off `item`, walking every hop of the chain.
    pub fn resolve(&self, item: &T) -> ExportResult<M> {
        (self.getter)(item).map_err(|depth| ExportError::FieldResolution {
            path: self.path(),
            message: format!(
                "member '{}' is not available on this instance",
                self.path.get(depth).map(String::as_str).unwrap_or_default()
            ),
        })
    }
}

/// An intermediate step of a nested field path, from `T` to a member of type `U`.
pub struct Hop<T, U> {
    path: Vec<String>,
    step: HopFn<T, U>,
}

impl<T: 'static, U: 'static> Hop<T, U> {
    /// Starts a chain at the member `name` of `T`.
    ///
    /// `first` returns `None` when the member is absent on an instance.
    pub fn new<F>(name: &str, first: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<&'a U> + 'static,
    {
        Hop {
            path: vec![name.to_owned()],
            step: Box::new(hop_fn::<T, U, _>(move |item| first(item).ok_or(0))),
        }
    }

    /// Extends the chain with the member `name` of `U`.
    pub fn then<V: 'static, F>(self, name: &str, next: F) -> Hop<T, V>
    where
        F: for<'a> Fn(&'a U) -> Option<&'a V> + 'static,
    {
        let Hop { mut path, step } = self;
        let depth = path.len();
        path.push(name.to_owned());

        Hop {
            path,
            step: Box::new(hop_fn::<T, V, _>(move |item| {
                let inner = step(item)?;
                next(inner).ok_or(depth)
            })),
        }
    }

    /// Ends the chain with the field `name` of `U`.
    pub fn field<M: 'static, F>(self, name: &str, getter: F) -> Accessor<T, M>
    where
        F: Fn(&U) -> M + 'static,
    {
        let Hop { mut path, step } = self;
        path.push(name.to_owned());

        Accessor {
            path,
            getter: Box::new(move |item: &T| step(item).map(|inner| getter(inner))),
        }
    }
}
