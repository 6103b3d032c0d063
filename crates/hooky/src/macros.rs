//! Convenience macros for declaring hookable types.

/// Builds an [`OperationDescriptor`](crate::operation::OperationDescriptor).
///
/// Usable in `static` initializers.
///
/// # Example
/// ```rust,ignore
/// static OPS: [OperationDescriptor; 2] = [
///     operation!(public save(path, overwrite)),
///     operation!(abstract protected fetch(uri)),
/// ];
/// ```
#[macro_export]
macro_rules! operation {
    (abstract $vis:ident $name:ident ( $($param:ident),* $(,)? )) => {
        $crate::operation!($vis $name($($param),*)).declared_abstract()
    };
    (public $name:ident ( $($param:ident),* $(,)? )) => {
        $crate::operation::OperationDescriptor::public(
            stringify!($name),
            &[$(stringify!($param)),*],
        )
    };
    (protected $name:ident ( $($param:ident),* $(,)? )) => {
        $crate::operation::OperationDescriptor::protected(
            stringify!($name),
            &[$(stringify!($param)),*],
        )
    };
    (private $name:ident ( $($param:ident),* $(,)? )) => {
        $crate::operation::OperationDescriptor::private(
            stringify!($name),
            &[$(stringify!($param)),*],
        )
    };
}

/// Packs call arguments into the `Vec<Value>` handed to dispatch.
///
/// # Example
/// ```rust,ignore
/// let args = hook_args!["report.pdf", true, json!({ "tags": ["q3"] })];
/// ```
#[macro_export]
macro_rules! hook_args {
    () => {
        ::std::vec::Vec::<$crate::serde_json::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::serde_json::json!($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use crate::operation::{OperationDescriptor, Visibility};
    use serde_json::json;

    static OPS: [OperationDescriptor; 3] = [
        operation!(public save(path, overwrite)),
        operation!(protected flush()),
        operation!(abstract private fetch(uri)),
    ];

    #[test]
    fn test_operation_macro() {
        assert_eq!(OPS[0].name, "save");
        assert_eq!(OPS[0].parameters, &["path", "overwrite"]);
        assert_eq!(OPS[0].visibility, Visibility::Public);
        assert!(OPS[1].parameters.is_empty());
        assert!(OPS[2].abstract_declared);
        assert_eq!(OPS[2].visibility, Visibility::Private);
    }

    #[test]
    fn test_hook_args_macro() {
        let path = "report.pdf".to_string();
        let args = hook_args![path, 3, json!({ "a": 1 })];
        assert_eq!(args, vec![json!("report.pdf"), json!(3), json!({ "a": 1 })]);
        assert!(hook_args![].is_empty());
    }
}
