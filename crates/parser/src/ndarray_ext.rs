//! Conversions between [`DataArray`] and `ndarray::ArrayD`.
//!
//! Enable with the `ndarray` feature. The first size maps to axis 0, so a
//! decoded array keeps its row-major layout.

use ndarray::{ArrayD, IxDyn};

use crate::{
    data::{DataArray, Element},
    error::{JnrrdError, Result},
};

impl DataArray {
    /// Copies any layout into row-major order. Zero-dimensional arrays and
    /// empty axes are rejected because the format cannot describe them.
    pub fn from_ndarray<T: Element>(array: ArrayD<T>) -> Result<Self> {
        let sizes = array.shape().to_vec();
        let values = match array.as_slice() {
            Some(values) => values.to_vec(),
            None => array.iter().copied().collect(),
        };
        DataArray::new(sizes, values)
    }

    pub fn to_ndarray<T: Element>(&self) -> Result<ArrayD<T>> {
        let values = self
            .as_slice::<T>()
            .ok_or(JnrrdError::ElementTypeMismatch {
                expected: T::ELEMENT_TYPE.name(),
                actual: self.element_type().name(),
            })?;
        ArrayD::from_shape_vec(IxDyn(self.sizes()), values.to_vec()).map_err(|e| {
            JnrrdError::InvalidField {
                field: "sizes",
                reason: e.to_string(),
            }
        })
    }
}
