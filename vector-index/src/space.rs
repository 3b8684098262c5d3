//! Vector spaces and the embeddings that live in them.
//!
//! The two collections hold vectors from distinct, non-interchangeable
//! models. Each space is a zero-sized marker type and every [`Embedding`]
//! carries its space as a type parameter, so a text-visual vector can only
//! ever be searched against the text-visual collection.

use std::fmt;
use std::marker::PhantomData;

use serde::{Serialize, Serializer};

/// Logical collection identifier, independent of its configured name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Joint text/visual space (text → image search).
    TextVisual,
    /// Image-only space (image → image search).
    PureVisual,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::TextVisual => f.write_str("text_visual"),
            Collection::PureVisual => f.write_str("pure_visual"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Marker trait implemented by the two known vector spaces.
pub trait VectorSpace: sealed::Sealed + Send + Sync + 'static {
    /// Collection that stores vectors of this space.
    const COLLECTION: Collection;
}

/// Joint text/visual embedding space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextVisual {}

/// Pure visual embedding space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PureVisual {}

impl sealed::Sealed for TextVisual {}
impl sealed::Sealed for PureVisual {}

impl VectorSpace for TextVisual {
    const COLLECTION: Collection = Collection::TextVisual;
}

impl VectorSpace for PureVisual {
    const COLLECTION: Collection = Collection::PureVisual;
}

/// Dense vector tagged with the space it was produced in.
pub struct Embedding<S: VectorSpace> {
    values: Vec<f32>,
    _space: PhantomData<S>,
}

impl<S: VectorSpace> Embedding<S> {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            _space: PhantomData,
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

// Manual impls so the marker type needs no extra bounds.
impl<S: VectorSpace> Clone for Embedding<S> {
    fn clone(&self) -> Self {
        Self::new(self.values.clone())
    }
}

impl<S: VectorSpace> PartialEq for Embedding<S> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<S: VectorSpace> fmt::Debug for Embedding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Embedding")
            .field("space", &S::COLLECTION)
            .field("dim", &self.values.len())
            .finish()
    }
}

impl<S: VectorSpace> Serialize for Embedding<S> {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        self.values.serialize(serializer)
    }
}
