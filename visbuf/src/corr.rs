//! Reordering of the four correlation planes of a polarization tensor.
//!
//! Upstream sources emit the four correlation products in "natural" order
//! `(P1P1, P1P2, P2P1, P2P2)`; downstream consumers want "sorted" order
//! `(P1P1, P2P2, P1P2, P2P1)`. Plane 0 stays fixed and planes 1, 2 and 3
//! rotate as a 3-cycle, so sorting and unsorting are exact inverses and a
//! round trip in either direction is the identity.
//!
//! The correlation axis is the leading (fastest) axis, so the four values
//! belonging to one `(channel, row)` position are adjacent in flat storage
//! and the rotation runs over `chunks_exact_mut(4)`.

use visbuf_error::{VisbufResult, visbuf_bail};
use visbuf_tensor::Tensor;

/// Rotate a 4-plane tensor from natural to sorted correlation order.
///
/// No-op for empty tensors; fails when the leading axis is not 4.
pub fn sort_correlation_planes<T: Copy>(tensor: &mut Tensor<T>) -> VisbufResult<()> {
    check_planes(tensor)?;
    for quad in tensor.as_mut_slice().chunks_exact_mut(4) {
        let tmp = quad[1];
        quad[1] = quad[2];
        quad[2] = quad[3];
        quad[3] = tmp;
    }
    Ok(())
}

/// Rotate a 4-plane tensor from sorted back to natural correlation order.
/// The exact inverse of [`sort_correlation_planes`].
pub fn unsort_correlation_planes<T: Copy>(tensor: &mut Tensor<T>) -> VisbufResult<()> {
    check_planes(tensor)?;
    for quad in tensor.as_mut_slice().chunks_exact_mut(4) {
        let tmp = quad[3];
        quad[3] = quad[2];
        quad[2] = quad[1];
        quad[1] = tmp;
    }
    Ok(())
}

fn check_planes<T>(tensor: &Tensor<T>) -> VisbufResult<()> {
    if !tensor.is_empty() && tensor.shape().leading() != 4 {
        visbuf_bail!(
            "correlation reordering requires 4 leading planes, got shape {}",
            tensor.shape()
        );
    }
    Ok(())
}
