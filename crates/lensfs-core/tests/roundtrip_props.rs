//! Property tests: encode -> text -> decode reproduces any value tree.

use lensfs_core::{Element, NumericArray, Value, decode, encode};
use proptest::prelude::*;

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |x| x.is_finite())
}

fn finite_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("finite", |x| x.is_finite())
}

fn array_with<S, F>(make: F) -> impl Strategy<Value = NumericArray>
where
    S: Strategy + 'static,
    S::Value: Element,
    F: Fn() -> S + 'static,
{
    prop::collection::vec(0usize..4, 0..4)
        .prop_flat_map(move |shape| {
            let n: usize = shape.iter().product();
            (Just(shape), prop::collection::vec(make(), n))
        })
        .prop_map(|(shape, data)| {
            NumericArray::from_shape_vec(&shape, data).expect("data length matches shape")
        })
}

fn any_array() -> impl Strategy<Value = NumericArray> {
    prop_oneof![
        array_with(any::<i8>),
        array_with(any::<i16>),
        array_with(any::<i32>),
        array_with(any::<i64>),
        array_with(any::<u8>),
        array_with(any::<u16>),
        array_with(any::<u32>),
        array_with(any::<u64>),
        array_with(finite_f32),
        array_with(finite_f64),
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        finite_f64().prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ]
}

fn tree(leaf: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Seq),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..5).prop_map(Value::Map),
        ]
    })
}

fn through_text(v: &Value) -> Value {
    let text = serde_json::to_string(&encode(v).unwrap()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    decode(&parsed).unwrap()
}

proptest! {
    #[test]
    fn arrays_anywhere_roundtrip(v in tree(prop_oneof![scalar(), any_array().prop_map(Value::Array)].boxed())) {
        prop_assert_eq!(through_text(&v), v);
    }

    #[test]
    fn array_free_trees_are_identity(v in tree(scalar().boxed())) {
        prop_assert!(!v.contains_array());
        prop_assert_eq!(&decode(&encode(&v).unwrap()).unwrap(), &v);
        prop_assert_eq!(through_text(&v), v);
    }
}
