//! Records: application types whose fields are bound to header paths.
//!
//! A record type lists its fields once in [`Record::fields`], in declaration order. Each
//! [`Field`] couples a [`DeclaredPath`] with the codec of the backing Rust type and a pair
//! of accessors, so scanning and writing never need runtime type inspection.
//!
//! ```
//! use sheet_headers::record::{Field, Record};
//!
//! #[derive(Debug, Default)]
//! struct Order {
//!     id: i64,
//!     paid: bool,
//! }
//!
//! impl Record for Order {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Field::new("订单|编号", |r: &Self| r.id, |r: &mut Self, v| r.id = v),
//!             Field::new("订单|已付", |r: &Self| r.paid, |r: &mut Self, v| r.paid = v),
//!         ]
//!     }
//! }
//! ```

use crate::{
    error::DecodeError,
    field::{CellCodec, DecodedCell, FieldKind, FieldValue},
    path::DeclaredPath,
};

type DecodeFn<R> = Box<dyn Fn(&mut R, DecodedCell) -> Result<(), DecodeError> + Send + Sync>;
type EncodeFn<R> = Box<dyn Fn(&R) -> FieldValue + Send + Sync>;

pub struct Field<R> {
    path: DeclaredPath,
    kind: FieldKind,
    decode: DecodeFn<R>,
    encode: EncodeFn<R>,
}

impl<R: 'static> Field<R> {
    pub fn new<T>(path: &str, get: fn(&R) -> T, set: fn(&mut R, T)) -> Self
    where
        T: CellCodec + 'static,
    {
        Self {
            path: DeclaredPath::parse(path),
            kind: T::KIND,
            decode: Box::new(move |target, cell| {
                let found = cell.value.kind();
                let value = T::from_cell(cell).ok_or(DecodeError::KindMismatch {
                    expected: T::KIND,
                    found,
                })?;
                set(target, value);
                Ok(())
            }),
            encode: Box::new(move |source| get(source).to_value()),
        }
    }

    /// Lifts a field of `R` into a field of a record `P` that contains an `R`.
    pub fn project<P: 'static>(self, get: fn(&P) -> &R, get_mut: fn(&mut P) -> &mut R) -> Field<P> {
        let Field {
            path,
            kind,
            decode,
            encode,
        } = self;
        Field {
            path,
            kind,
            decode: Box::new(move |target, cell| decode(get_mut(target), cell)),
            encode: Box::new(move |source| encode(get(source))),
        }
    }
}

impl<R> Field<R> {
    pub fn path(&self) -> &DeclaredPath {
        &self.path
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn decode_into(
        &self,
        target: &mut R,
        raw: &str,
        col_index: usize,
    ) -> Result<(), DecodeError> {
        let value = self.kind.decode(raw)?;
        (self.decode)(target, DecodedCell { value, col_index })
    }

    pub fn encode(&self, source: &R) -> FieldValue {
        (self.encode)(source)
    }
}

impl<R> std::fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

pub trait Record: Default + Send + 'static {
    fn fields() -> Vec<Field<Self>>;
}

pub fn declared_paths<R: Record>() -> Vec<DeclaredPath> {
    R::fields().into_iter().map(|f| f.path).collect()
}

// Several records scanned from one row: fields are concatenated in tuple order.
macro_rules! tuple_record {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Record),+> Record for ($($name,)+) {
            fn fields() -> Vec<Field<Self>> {
                let mut fields = Vec::new();
                $(
                    fields.extend($name::fields().into_iter().map(|field| {
                        field.project::<Self>(|t: &Self| &t.$idx, |t: &mut Self| &mut t.$idx)
                    }));
                )+
                fields
            }
        }
    };
}

tuple_record!(A: 0, B: 1);
tuple_record!(A: 0, B: 1, C: 2);
tuple_record!(A: 0, B: 1, C: 2, D: 3);
