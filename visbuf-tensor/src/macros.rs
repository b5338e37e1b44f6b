/// A macro for constructing rank-1 tensors akin to `vec![..]`.
#[macro_export]
macro_rules! tensor {
    () => (
        $crate::Tensor::empty()
    );
    ($elem:expr; $n:expr) => (
        $crate::Tensor::full($elem, [$n])
    );
    ($($x:expr),+ $(,)?) => (
        $crate::Tensor::from_rank1(vec![$($x),+])
    );
}
