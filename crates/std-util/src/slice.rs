#[macro_export]
macro_rules! assert_empty {
    ($e:expr) => {
        match &$e {
            actual if actual.is_empty() => {}
            actual => panic!("expected empty; actual={:?}", actual),
        }
    };
}
