use crate::VisbufResult;

/// Unwrap with a contextual message, for paths that cannot fail by
/// construction. Prefer this over `expect` so failures carry the original
/// error alongside the context.
pub trait VisbufExpect<T> {
    /// Unwrap the value, panicking with `msg` and the underlying error if
    /// absent.
    fn visbuf_expect(self, msg: &str) -> T;
}

impl<T> VisbufExpect<T> for VisbufResult<T> {
    #[allow(clippy::panic)]
    fn visbuf_expect(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("{msg}: {e}"),
        }
    }
}

impl<T> VisbufExpect<T> for Option<T> {
    #[allow(clippy::panic)]
    fn visbuf_expect(self, msg: &str) -> T {
        match self {
            Some(v) => v,
            None => panic!("{msg}"),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{VisbufExpect, VisbufResult, visbuf_err};

    #[test]
    fn expect_passes_values_through() {
        let ok: VisbufResult<i32> = Ok(7);
        assert_eq!(ok.visbuf_expect("must hold"), 7);
        assert_eq!(Some(7).visbuf_expect("must hold"), 7);
    }

    #[test]
    #[should_panic(expected = "must hold: buffer is not writable")]
    fn expect_carries_context_and_error() {
        let err: VisbufResult<i32> = Err(visbuf_err!(ReadOnly));
        err.visbuf_expect("must hold");
    }
}
