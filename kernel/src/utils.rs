//! Various utility macros used throughout the kernel

/// convenient way to return an error if a condition isn't true
macro_rules! require {
    ( $cond:expr, $err:expr ) => {
        if !($cond) {
            return Err($err);
        }
    };
}

pub(crate) use require;

#[cfg(test)]
mod tests {
    use crate::{Error, KernelResult};

    fn positive(value: i32) -> KernelResult<i32> {
        require!(
            value > 0,
            Error::generic(format!("{value} is not positive"))
        );
        Ok(value)
    }

    #[test]
    fn test_require() {
        assert_eq!(positive(3).unwrap(), 3);
        let err = positive(-1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Generic schema kernel error: -1 is not positive"
        );
    }
}
