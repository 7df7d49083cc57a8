//! Core Tensor type

use super::{Location, Shape, Storage, Strides, TensorId, size};
use crate::dtype::{DType, Element, HostBuffer};
use crate::error::{Error, Result};
use crate::runtime::{Context, DeviceTexture, TexLayout, TextureHandle};
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

/// Initial data for a tensor: host values or an accelerator texture
///
/// Exactly one of `values` and `texture` must be set. A texture must come
/// with its layout and the context whose manager owns it.
#[derive(Debug, Default)]
pub struct TensorData {
    /// Host values, one per element in row-major order
    pub values: Option<HostBuffer>,
    /// Texture holding the values
    pub texture: Option<TextureHandle>,
    /// 2D layout the texture was acquired with
    pub texture_layout: Option<TexLayout>,
    /// Context owning the texture
    pub context: Option<Context>,
}

impl TensorData {
    /// Data supplied as host values
    pub fn values(values: HostBuffer) -> Self {
        Self {
            values: Some(values),
            ..Self::default()
        }
    }

    /// Data supplied as a texture acquired from `context`
    ///
    /// The resulting tensor takes ownership of the texture.
    pub fn texture(context: &Context, handle: TextureHandle, layout: TexLayout) -> Self {
        Self {
            texture: Some(handle),
            texture_layout: Some(layout),
            context: Some(context.clone()),
            ..Self::default()
        }
    }
}

/// N-dimensional array living in host memory or an accelerator texture
///
/// `Tensor` consists of:
/// - **Shape** and its cached row-major **strides**
/// - **DType**: element type tag
/// - **Storage**: reference-counted data that migrates between host and
///   accelerator on demand
///
/// Reading values downloads the data if it is on the accelerator;
/// [`Tensor::upload`] moves it the other way. Both transitions are no-ops
/// when the data is already where it is needed.
///
/// # Aliasing
///
/// [`Tensor::reshape`] and `clone()` produce aliases that share storage.
/// Writes and migrations through one alias are visible through all of them.
/// [`Tensor::dispose`] only retires the alias it is called on; the data is
/// released once every alias is disposed or dropped.
///
/// # Example
///
/// ```
/// use ndtex::tensor::Tensor;
///
/// let t = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// assert_eq!(t.get(&[1, 2]).unwrap(), 6.0);
/// ```
pub struct Tensor {
    id: TensorId,
    shape: Shape,
    strides: Strides,
    size: usize,
    dtype: DType,
    storage: Option<Storage>,
}

impl Tensor {
    /// Create a tensor from a shape, initial data, and element type
    ///
    /// # Errors
    ///
    /// - `IncompleteStorage` if not exactly one of values/texture is given,
    ///   or a texture is given without its layout (or the reverse)
    /// - `DTypeMismatch` if host values are of a different dtype
    /// - `ShapeMismatch` if host values (or the texture capacity) do not
    ///   match `size(shape)`
    /// - `UninitializedBackend` if a texture comes without an initialized
    ///   context
    pub fn new(shape: &[usize], data: TensorData, dtype: DType) -> Result<Self> {
        let TensorData {
            values,
            texture,
            texture_layout,
            context,
        } = data;
        let expected = size(shape);

        let storage = match (values, texture, texture_layout) {
            (_, Some(_), None) | (_, None, Some(_)) => {
                return Err(Error::IncompleteStorage {
                    reason: "texture and texture layout must be given together",
                });
            }
            (Some(_), Some(_), Some(_)) | (None, None, None) => {
                return Err(Error::IncompleteStorage {
                    reason: "exactly one of values or texture must be given",
                });
            }
            (Some(mut values), None, None) => {
                if values.dtype() != dtype {
                    return Err(Error::dtype_mismatch(dtype, values.dtype()));
                }
                if values.len() != expected {
                    return Err(Error::shape_mismatch(shape, &[values.len()]));
                }
                values.normalize();
                Storage::from_host(values)
            }
            (None, Some(handle), Some(layout)) => {
                let context = context
                    .filter(Context::is_initialized)
                    .ok_or(Error::UninitializedBackend)?;
                if layout.capacity() < expected {
                    return Err(Error::shape_mismatch(shape, &[layout.rows, layout.cols]));
                }
                Storage::from_device(DeviceTexture::adopt(&context, handle, layout))
            }
        };

        Ok(Self::from_parts(shape.into(), dtype, storage))
    }

    /// Assemble a tensor over existing storage (no validation)
    pub(crate) fn from_parts(shape: Shape, dtype: DType, storage: Storage) -> Self {
        let strides = Strides::row_major(&shape);
        let size = shape.size();
        Self {
            id: TensorId::next(),
            shape,
            strides,
            size,
            dtype,
            storage: Some(storage),
        }
    }

    /// Create a tensor from a slice of data
    ///
    /// The dtype is inferred from the element type.
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::new(shape, TensorData::values(HostBuffer::from_slice(data)), T::DTYPE)
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let values = HostBuffer::zeros(dtype, size(shape));
        Self::from_parts(shape.into(), dtype, Storage::from_host(values))
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize], dtype: DType) -> Self {
        Self::full(shape, dtype, 1.0)
    }

    /// Create a tensor filled with a scalar value
    ///
    /// The scalar is converted to the target dtype.
    pub fn full(shape: &[usize], dtype: DType, value: f64) -> Self {
        let values = HostBuffer::full(dtype, size(shape), value);
        Self::from_parts(shape.into(), dtype, Storage::from_host(values))
    }

    /// Create a zero tensor with the shape and dtype of `other`
    pub fn zeros_like(other: &Tensor) -> Self {
        Self::zeros(&other.shape, other.dtype)
    }

    /// Deep-copy `other` into an independent host-resident tensor
    ///
    /// Downloads `other` if it is on the accelerator.
    pub fn make_like(other: &Tensor) -> Result<Self> {
        let values = other.values()?;
        Ok(Self::from_parts(
            other.shape.clone(),
            other.dtype,
            Storage::from_host(values),
        ))
    }

    // ===== Accessors =====

    /// Get the tensor ID
    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    /// Get the shape (empty once disposed)
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the cached stride table
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Get the storage, unless disposed
    #[inline]
    pub fn storage(&self) -> Option<&Storage> {
        self.storage.as_ref()
    }

    /// Whether [`Tensor::dispose`] has been called
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.storage.is_none()
    }

    /// Where the data currently lives
    pub fn location(&self) -> Result<Location> {
        Ok(self.live_storage()?.location())
    }

    /// Whether the data is on the accelerator
    pub fn is_uploaded(&self) -> bool {
        self.storage
            .as_ref()
            .is_some_and(|s| s.location() == Location::Device)
    }

    /// Layout of the texture holding the data, if uploaded
    pub fn texture_layout(&self) -> Option<TexLayout> {
        self.storage.as_ref().and_then(Storage::texture_layout)
    }

    /// Number of live tensors sharing this tensor's storage (0 once disposed)
    pub fn alias_count(&self) -> usize {
        self.storage.as_ref().map_or(0, Storage::ref_count)
    }

    /// Check if two tensors share the same storage
    pub fn shares_storage(&self, other: &Tensor) -> bool {
        match (&self.storage, &other.storage) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    fn live_storage(&self) -> Result<&Storage> {
        self.storage.as_ref().ok_or(Error::Disposed)
    }

    // ===== Migration =====

    /// Move the data to the accelerator (no-op if already there)
    ///
    /// Returns the handle of the texture holding the data.
    pub fn upload(&self, context: &Context) -> Result<TextureHandle> {
        self.texture(context, None).map(|(handle, _)| handle)
    }

    /// Get the texture holding the data, uploading it first if needed
    ///
    /// `preferred` is passed to the manager's layout negotiation; it is
    /// ignored when the data is already on the accelerator, since the layout
    /// is fixed once negotiated.
    pub fn texture(
        &self,
        context: &Context,
        preferred: Option<TexLayout>,
    ) -> Result<(TextureHandle, TexLayout)> {
        let storage = self.live_storage()?;
        storage
            .upload(context, &self.shape, preferred)
            .inspect(|(handle, layout)| {
                debug!(tensor = %self.id, texture = %handle, %layout, "texture ready");
            })
    }

    /// Move the data back to host memory, blocking until it is available
    pub fn download(&self) -> Result<()> {
        self.live_storage()?.download(self.dtype, self.size)
    }

    /// Move the data back to host memory without blocking on the accelerator
    ///
    /// When the manager supports readiness checkpoints, this waits on one
    /// queued behind all prior work and only then copies; otherwise it
    /// performs the blocking download immediately. Either way the values
    /// obtained are the same.
    pub async fn download_async(&self) -> Result<()> {
        let storage = self.live_storage()?;
        if let Some(context) = storage.device_context() {
            let checkpoint = context.manager()?.enqueue_checkpoint();
            match checkpoint {
                Some(checkpoint) => {
                    debug!(tensor = %self.id, "awaiting readiness checkpoint");
                    checkpoint.await;
                }
                None => {
                    debug!(tensor = %self.id, "no checkpoint support, downloading synchronously");
                }
            }
        }
        self.download()
    }

    // ===== Data Access =====

    /// Copy the values to a new host buffer
    ///
    /// Downloads the data first if it is on the accelerator.
    pub fn values(&self) -> Result<HostBuffer> {
        self.live_storage()?
            .with_host(self.dtype, self.size, |values| values.clone())
    }

    /// Copy the values to a new host buffer, downloading asynchronously
    pub async fn values_async(&self) -> Result<HostBuffer> {
        self.download_async().await?;
        self.values()
    }

    /// Copy the values to a typed Vec
    ///
    /// Returns `DTypeMismatch` if `T` does not match the tensor's dtype.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(Error::dtype_mismatch(self.dtype, T::DTYPE));
        }
        self.live_storage()?
            .with_host(self.dtype, self.size, |values| values.to_vec::<T>())?
    }

    /// Read the element at a flat offset
    pub(crate) fn read_flat(&self, index: usize) -> Result<f64> {
        self.live_storage()?
            .with_host(self.dtype, self.size, |values| values.get(index))?
    }

    /// Overwrite the element at a flat offset
    pub(crate) fn write_flat(&self, index: usize, value: f64) -> Result<()> {
        self.live_storage()?
            .with_host(self.dtype, self.size, |values| values.set(index, value))?
    }

    /// Add to the element at a flat offset
    pub(crate) fn add_flat(&self, index: usize, delta: f64) -> Result<()> {
        self.live_storage()?
            .with_host(self.dtype, self.size, |values| values.add(index, delta))?
    }

    /// Reject disposed tensors, then index tuples of the wrong arity
    pub(crate) fn check_rank(&self, locs: &[usize]) -> Result<()> {
        self.live_storage()?;
        if locs.len() != self.rank() {
            return Err(Error::invalid_rank(self.rank(), locs.len()));
        }
        Ok(())
    }

    // ===== Indexing =====

    /// Flat offset of a multi-index: `locs[last] + Σ strides[i] * locs[i]`
    ///
    /// Per-dimension bounds are not checked.
    #[inline]
    pub fn loc_to_index(&self, locs: &[usize]) -> usize {
        self.strides.offset(locs)
    }

    /// Multi-index of a flat offset, most-significant dimension first
    pub fn index_to_loc(&self, index: usize) -> Shape {
        self.strides.unravel(index, self.rank()).into()
    }

    /// Read the element at `locs` (one index per dimension)
    pub fn get(&self, locs: &[usize]) -> Result<f64> {
        self.check_rank(locs)?;
        self.read_flat(self.loc_to_index(locs))
    }

    /// Overwrite the element at `locs`
    pub fn set(&self, value: f64, locs: &[usize]) -> Result<()> {
        self.check_rank(locs)?;
        self.write_flat(self.loc_to_index(locs), value)
    }

    /// Add `delta` to the element at `locs`
    pub fn add(&self, delta: f64, locs: &[usize]) -> Result<()> {
        self.check_rank(locs)?;
        self.add_flat(self.loc_to_index(locs), delta)
    }

    /// Overwrite every element with `value`
    pub fn fill(&self, value: f64) -> Result<()> {
        self.live_storage()?
            .with_host(self.dtype, self.size, |values| values.fill(value))
    }

    /// Structural equality: same dtype, same shape, equal values
    ///
    /// Downloads both tensors if needed.
    pub fn equals(&self, other: &Tensor) -> Result<bool> {
        if self.dtype != other.dtype || self.shape != other.shape {
            return Ok(false);
        }
        // Read one side at a time: aliases share a lock.
        let lhs = self.values()?;
        let rhs = other.values()?;
        Ok(lhs == rhs)
    }

    // ===== Views =====

    /// Reshape to a new shape, sharing storage (zero-copy)
    ///
    /// At most one dimension may be `-1`; it is inferred from the others.
    /// Returns `self` borrowed when the resolved shape equals the current
    /// one, otherwise a new alias over the same storage.
    ///
    /// # Example
    ///
    /// ```
    /// use ndtex::tensor::Tensor;
    /// use ndtex::dtype::DType;
    ///
    /// let v = Tensor::zeros(&[6], DType::F32);
    /// let m = v.reshape(&[-1, 2]).unwrap();
    /// assert_eq!(m.shape(), &[3, 2]);
    /// assert!(v.reshape(&[4, 2]).is_err());
    /// ```
    pub fn reshape(&self, shape: &[isize]) -> Result<Cow<'_, Tensor>> {
        let storage = self.live_storage()?;
        let resolved = infer_shape(shape, self.size)?;
        if resolved == self.shape {
            return Ok(Cow::Borrowed(self));
        }

        let alias = Self::from_parts(resolved, self.dtype, storage.clone());
        debug!(
            tensor = %self.id,
            alias = %alias.id,
            from = ?self.shape,
            to = ?alias.shape,
            "reshape alias"
        );
        Ok(Cow::Owned(alias))
    }

    /// Retire this tensor
    ///
    /// Clears the shape and drops this alias's reference to the storage.
    /// When no other alias remains, the host buffer is freed or the texture
    /// returned to its pool. Every later read fails with `Disposed`.
    /// Disposing twice is a no-op.
    pub fn dispose(&mut self) {
        if let Some(storage) = self.storage.take() {
            let remaining = storage.ref_count() - 1;
            debug!(tensor = %self.id, remaining_aliases = remaining, "dispose");
            drop(storage);
        }
        self.shape = Shape::new();
        self.strides = Strides::default();
        self.size = 0;
    }
}

/// Resolve a shape with at most one `-1` against an element count
fn infer_shape(shape: &[isize], size: usize) -> Result<Shape> {
    let inferred = shape.iter().filter(|&&d| d == -1).count();
    if inferred > 1 {
        return Err(Error::invalid_shape(
            shape,
            size,
            "only one dimension can be inferred",
        ));
    }
    if shape.iter().any(|&d| d < -1) {
        return Err(Error::invalid_shape(shape, size, "negative dimension"));
    }

    let known = checked_size(shape.iter().filter(|&&d| d >= 0).map(|&d| d as usize))
        .ok_or_else(|| Error::invalid_shape(shape, size, "size overflows usize"))?;
    let fill = if inferred == 1 {
        if known == 0 || size % known != 0 {
            return Err(Error::invalid_shape(
                shape,
                size,
                "inferred dimension does not divide the size",
            ));
        }
        size / known
    } else {
        0
    };

    let resolved: Shape = shape
        .iter()
        .map(|&d| if d == -1 { fill } else { d as usize })
        .collect();
    match checked_size(resolved.iter().copied()) {
        Some(n) if n == size => {}
        Some(_) => {
            return Err(Error::invalid_shape(
                shape,
                size,
                "size differs from the tensor's",
            ));
        }
        None => return Err(Error::invalid_shape(shape, size, "size overflows usize")),
    }
    Ok(resolved)
}

/// Element count of `dims`, or `None` if it overflows
///
/// Any zero dimension makes the count zero, whatever the others are.
fn checked_size(mut dims: impl Iterator<Item = usize> + Clone) -> Option<usize> {
    if dims.clone().any(|d| d == 0) {
        return Some(0);
    }
    dims.try_fold(1usize, usize::checked_mul)
}

impl Clone for Tensor {
    /// Clone creates a new alias sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        Self {
            id: TensorId::next(),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            size: self.size,
            dtype: self.dtype,
            storage: self.storage.clone(),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("storage", &self.storage)
            .finish()
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_disposed() {
            return write!(f, "Tensor(disposed, dtype={})", self.dtype);
        }
        write!(f, "Tensor({:?}, dtype={})", self.shape, self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tensor = Tensor::from_slice(&data, &[2, 3]).unwrap();

        assert_eq!(tensor.shape(), &[2, 3]);
        assert_eq!(tensor.strides(), &[3]);
        assert_eq!(tensor.dtype(), DType::F32);
        assert_eq!(tensor.size(), 6);
        assert_eq!(tensor.location().unwrap(), Location::Host);

        let result: Vec<f32> = tensor.to_vec().unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_new_shape_mismatch() {
        let values = HostBuffer::F32(vec![1.0, 2.0, 3.0]);
        let result = Tensor::new(&[2, 2], TensorData::values(values), DType::F32);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_new_dtype_mismatch() {
        let values = HostBuffer::I32(vec![1, 2]);
        let result = Tensor::new(&[2], TensorData::values(values), DType::F32);
        assert!(matches!(result, Err(Error::DTypeMismatch { .. })));
    }

    #[test]
    fn test_new_incomplete_storage() {
        let no_data = Tensor::new(&[2], TensorData::default(), DType::F32);
        assert!(matches!(no_data, Err(Error::IncompleteStorage { .. })));

        let texture_only = TensorData {
            texture: Some(TextureHandle::from_raw(1)),
            ..TensorData::default()
        };
        let result = Tensor::new(&[2], texture_only, DType::F32);
        assert!(matches!(result, Err(Error::IncompleteStorage { .. })));

        let layout_only = TensorData {
            values: Some(HostBuffer::F32(vec![0.0, 0.0])),
            texture_layout: Some(TexLayout::new(1, 2)),
            ..TensorData::default()
        };
        let result = Tensor::new(&[2], layout_only, DType::F32);
        assert!(matches!(result, Err(Error::IncompleteStorage { .. })));
    }

    #[test]
    fn test_new_texture_without_backend() {
        let ctx = Context::new();
        let data = TensorData::texture(&ctx, TextureHandle::from_raw(1), TexLayout::new(1, 2));
        let result = Tensor::new(&[2], data, DType::F32);
        assert!(matches!(result, Err(Error::UninitializedBackend)));
    }

    #[test]
    fn test_bool_values_stored_as_zero_or_one() {
        let t = Tensor::from_slice(&[5u8, 0], &[2]).unwrap();
        assert_eq!(t.get(&[0]).unwrap(), 1.0);
        assert!(t.equals(&Tensor::from_slice(&[1u8, 0], &[2]).unwrap()).unwrap());

        let raw = TensorData::values(HostBuffer::Bool(vec![0, 9, 3]));
        let t = Tensor::new(&[3], raw, DType::Bool).unwrap();
        assert_eq!(t.to_vec::<u8>().unwrap(), vec![0, 1, 1]);
    }

    #[test]
    fn test_zeros_and_full() {
        let zeros = Tensor::zeros(&[2, 3], DType::I32);
        assert_eq!(zeros.to_vec::<i32>().unwrap(), vec![0; 6]);

        let full = Tensor::full(&[2, 2], DType::F32, 42.0);
        assert_eq!(full.to_vec::<f32>().unwrap(), vec![42.0; 4]);

        let ones = Tensor::ones(&[3], DType::Bool);
        assert_eq!(ones.to_vec::<u8>().unwrap(), vec![1, 1, 1]);
    }

    #[test]
    fn test_rank0() {
        let scalar = Tensor::from_slice(&[7i32], &[]).unwrap();
        assert_eq!(scalar.rank(), 0);
        assert_eq!(scalar.size(), 1);
        assert_eq!(scalar.get(&[]).unwrap(), 7.0);
        assert!(scalar.index_to_loc(0).is_empty());
    }

    #[test]
    fn test_get_set_add() {
        let t = Tensor::zeros(&[2, 3, 4], DType::F32);
        t.set(5.0, &[1, 2, 3]).unwrap();
        t.add(1.5, &[1, 2, 3]).unwrap();
        assert_eq!(t.get(&[1, 2, 3]).unwrap(), 6.5);
        assert_eq!(t.loc_to_index(&[1, 2, 3]), 23);
        assert_eq!(t.index_to_loc(23).as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_wrong_index_arity() {
        let t = Tensor::zeros(&[2, 2], DType::F32);
        assert!(matches!(
            t.get(&[1]),
            Err(Error::InvalidRank {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_flat_index_out_of_bounds() {
        let t = Tensor::zeros(&[2, 2], DType::F32);
        assert!(matches!(
            t.get(&[2, 0]),
            Err(Error::IndexOutOfBounds { index: 4, size: 4 })
        ));
    }

    #[test]
    fn test_fill() {
        let t = Tensor::zeros(&[2, 2], DType::I32);
        t.fill(3.0).unwrap();
        assert_eq!(t.to_vec::<i32>().unwrap(), vec![3; 4]);
    }

    #[test]
    fn test_to_vec_dtype_mismatch() {
        let t = Tensor::zeros(&[2], DType::I32);
        assert!(matches!(
            t.to_vec::<f32>(),
            Err(Error::DTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_equals() {
        let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let b = Tensor::make_like(&a).unwrap();
        assert!(a.equals(&b).unwrap());
        assert!(!a.shares_storage(&b));

        let flat = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[4]).unwrap();
        assert!(!a.equals(&flat).unwrap());

        let ints = Tensor::from_slice(&[1i32, 2, 3, 4], &[2, 2]).unwrap();
        assert!(!a.equals(&ints).unwrap());
    }

    #[test]
    fn test_make_like_is_deep() {
        let a = Tensor::from_slice(&[1.0f32, 2.0], &[2]).unwrap();
        let b = Tensor::make_like(&a).unwrap();
        b.set(9.0, &[0]).unwrap();
        assert_eq!(a.get(&[0]).unwrap(), 1.0);
    }

    #[test]
    fn test_reshape_identity() {
        let t = Tensor::zeros(&[2, 3], DType::F32);
        let same = t.reshape(&[2, 3]).unwrap();
        assert!(matches!(same, Cow::Borrowed(r) if std::ptr::eq(r, &t)));

        let inferred = t.reshape(&[2, -1]).unwrap();
        assert!(matches!(inferred, Cow::Borrowed(_)));
    }

    #[test]
    fn test_reshape_infers_dimension() {
        let v = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[6]).unwrap();
        let m = v.reshape(&[-1, 2]).unwrap();
        assert_eq!(m.shape(), &[3, 2]);
        assert_eq!(m.strides(), &[2]);
        assert!(m.shares_storage(&v));
        assert_eq!(v.alias_count(), 2);
    }

    #[test]
    fn test_reshape_invalid() {
        let v = Tensor::zeros(&[6], DType::F32);
        let shapes: [&[isize]; 5] = [&[4, 2], &[-1, -1], &[-1, 4], &[-2, -3], &[0, -1]];
        for shape in shapes {
            assert!(
                matches!(v.reshape(shape), Err(Error::InvalidShape { .. })),
                "shape {shape:?}"
            );
        }
    }

    #[test]
    fn test_reshape_overflowing_dims() {
        let v = Tensor::zeros(&[6], DType::F32);
        let huge = 1isize << 40;
        let shapes: [&[isize]; 3] = [&[huge, huge], &[huge, huge, -1], &[-1, huge, huge]];
        for shape in shapes {
            assert!(
                matches!(v.reshape(shape), Err(Error::InvalidShape { .. })),
                "shape {shape:?}"
            );
        }

        // A zero dimension makes the count zero regardless of the others
        let empty = Tensor::zeros(&[0], DType::F32);
        for shape in [[huge, huge, 0], [0, huge, huge]] {
            let view = empty.reshape(&shape).unwrap();
            assert_eq!(view.size(), 0);
        }
    }

    #[test]
    fn test_reshape_writes_are_shared() {
        let v = Tensor::zeros(&[4], DType::F32);
        let m = v.reshape(&[2, 2]).unwrap().into_owned();
        m.set(8.0, &[1, 0]).unwrap();
        assert_eq!(v.get(&[2]).unwrap(), 8.0);
    }

    #[test]
    fn test_dispose() {
        let mut t = Tensor::zeros(&[2, 2], DType::F32);
        t.dispose();
        assert!(t.is_disposed());
        assert!(t.shape().is_empty());
        assert!(matches!(t.values(), Err(Error::Disposed)));
        assert!(matches!(t.reshape(&[4]), Err(Error::Disposed)));
        assert!(matches!(t.get(&[0, 0]), Err(Error::Disposed)));
        t.dispose();
    }

    #[test]
    fn test_dispose_alias_keeps_siblings() {
        let v = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[4]).unwrap();
        let mut m = v.reshape(&[2, 2]).unwrap().into_owned();
        assert_eq!(v.alias_count(), 2);

        m.dispose();
        assert_eq!(v.alias_count(), 1);
        assert_eq!(v.to_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_display() {
        let mut t = Tensor::zeros(&[2, 3], DType::F32);
        assert_eq!(t.to_string(), "Tensor([2, 3], dtype=f32)");
        t.dispose();
        assert_eq!(t.to_string(), "Tensor(disposed, dtype=f32)");
    }
}
