use super::*;
use crate::config::{MarshalOptions, Order};
use crate::error::GrblasError;
use crate::types::dtype::{BOOL, FP32, FP64, INDEX, INT32, INT64, INT8, UINT64};
use crate::types::{DtypeSpecifier, HostValue, ScalarValue};
use ndarray::Array2;
use std::ffi::c_void;

fn ints(values: &[i64]) -> Vec<HostValue> {
    values.iter().map(|&v| HostValue::Int(v)).collect()
}

//==================================================================================
// marshal_index_buffer
//==================================================================================

#[test]
fn test_index_buffer_length_and_values_match_input() {
    let input = ints(&[0, 3, 7, 7, 12]);
    let buffer = marshal_index_buffer(&input, &INDEX, "rows", &MarshalOptions::default()).unwrap();
    assert_eq!(buffer.len(), input.len());
    assert_eq!(buffer.dtype().c_type, "GrB_Index");
    assert_eq!(buffer.to_vec::<u64>().unwrap(), vec![0, 3, 7, 7, 12]);
}

#[test]
fn test_index_buffer_coerces_each_element() {
    let input = vec![HostValue::Bool(true), HostValue::Int(-2), HostValue::Float(3.9)];
    let buffer = marshal_index_buffer(&input, &INT8, "counts", &MarshalOptions::default()).unwrap();
    assert_eq!(buffer.to_vec::<i8>().unwrap(), vec![1, -2, 3]);
}

#[test]
fn test_index_buffer_rejects_float_arrays() {
    let array = HostArray::from_vec(vec![1.0f64, 2.0]);
    let err = marshal_index_buffer(&array, &INDEX, "columns", &MarshalOptions::default())
        .unwrap_err();
    match err {
        GrblasError::TypeMismatch { name, found } => {
            assert_eq!(name, "columns");
            assert_eq!(found, "float64");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_index_buffer_rejects_object_arrays() {
    let array = HostArray::objects(ints(&[1, 2]));
    let err = marshal_index_buffer(&array, &INDEX, "rows", &MarshalOptions::default()).unwrap_err();
    assert!(matches!(err, GrblasError::TypeMismatch { ref found, .. } if found == "object"));
}

#[test]
fn test_index_buffer_accepts_bool_arrays() {
    let array = HostArray::from_vec(vec![true, false, true]);
    let buffer = marshal_index_buffer(&array, &INDEX, "mask", &MarshalOptions::default()).unwrap();
    assert_eq!(buffer.to_vec::<u64>().unwrap(), vec![1, 0, 1]);
}

#[test]
fn test_index_buffer_empty_input() {
    let empty: Vec<HostValue> = Vec::new();
    let buffer = marshal_index_buffer(&empty, &INDEX, "rows", &MarshalOptions::ownable()).unwrap();
    assert!(buffer.is_empty());
    assert!(buffer.is_owned());
}

#[test]
fn test_index_buffer_out_of_range() {
    let err = marshal_index_buffer(&ints(&[-1]), &UINT64, "rows", &MarshalOptions::default())
        .unwrap_err();
    assert!(matches!(err, GrblasError::ValueOutOfRange { ref name, .. } if name == "rows"));
}

#[test]
fn test_index_buffer_accepts_dtype_names() {
    let input = ints(&[5]);
    let buffer = marshal_index_buffer(&input, "int32", "n", &MarshalOptions::default()).unwrap();
    assert_eq!(buffer.dtype(), &INT32);
}

//==================================================================================
// Ownership
//==================================================================================

#[test]
fn test_matching_array_is_viewed_in_place() {
    let array = HostArray::from_vec(vec![4u64, 5, 6]);
    let (_, bytes) = array.typed_bytes().unwrap();
    let buffer = marshal_index_buffer(&array, &INDEX, "rows", &MarshalOptions::default()).unwrap();
    assert!(!buffer.is_owned());
    assert_eq!(buffer.as_ptr(), bytes.as_ptr().cast::<c_void>());
}

#[test]
fn test_copy_flag_forces_fresh_storage() {
    let array = HostArray::from_vec(vec![4u64, 5, 6]);
    let (_, bytes) = array.typed_bytes().unwrap();
    let buffer = marshal_index_buffer(&array, &INDEX, "rows", &MarshalOptions::copied()).unwrap();
    assert!(buffer.is_owned());
    assert_ne!(buffer.as_ptr(), bytes.as_ptr().cast::<c_void>());
}

#[test]
fn test_ownable_copies_a_view() {
    let array = HostArray::from_vec(vec![4u64, 5, 6]);
    let (_, bytes) = array.typed_bytes().unwrap();
    let buffer = marshal_index_buffer(&array, &INDEX, "rows", &MarshalOptions::ownable()).unwrap();
    assert!(buffer.is_owned());
    assert_ne!(buffer.as_ptr(), bytes.as_ptr().cast::<c_void>());

    // The owned buffer is independent of the array it came from.
    let mut owned = buffer.into_owned();
    owned.as_mut_slice::<u64>().unwrap()[0] = 40;
    assert_eq!(array.get(0), Some(HostValue::Typed(ScalarValue::UInt64(4))));
    assert_eq!(owned.to_vec::<u64>().unwrap(), vec![40, 5, 6]);
}

#[test]
fn test_converted_array_is_already_owned() {
    let array = HostArray::from_vec(vec![4i32, 5, 6]);
    let buffer = marshal_index_buffer(&array, &INDEX, "rows", &MarshalOptions::default()).unwrap();
    assert!(buffer.is_owned());
    assert_eq!(buffer.to_vec::<u64>().unwrap(), vec![4, 5, 6]);
}

//==================================================================================
// marshal_value_buffer
//==================================================================================

#[test]
fn test_value_buffer_infers_64_bit_ints_from_plain_lists() {
    let input = ints(&[1, 2, 3]);
    let (buffer, dtype) = marshal_value_buffer(&input, None, &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &INT64);
    assert_eq!(buffer.to_vec::<i64>().unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_value_buffer_keeps_typed_array_dtype() {
    let array = HostArray::from_vec(vec![1i32, 2, 3]);
    let (buffer, dtype) = marshal_value_buffer(&array, None, &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &INT32);
    assert!(!buffer.is_owned());
}

#[test]
fn test_value_buffer_infers_floats_and_bools() {
    let floats = vec![HostValue::Int(1), HostValue::Float(-1.1)];
    let (_, dtype) = marshal_value_buffer(&floats, None, &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &FP64);

    let bools = vec![HostValue::Bool(false)];
    let (buffer, dtype) = marshal_value_buffer(&bools, None, &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &BOOL);
    assert_eq!(buffer.get(0), Some(ScalarValue::Bool(false)));
}

#[test]
fn test_value_buffer_keeps_typed_element_dtypes() {
    let big = vec![HostValue::Typed(ScalarValue::UInt64(u64::MAX))];
    let (buffer, dtype) = marshal_value_buffer(&big, None, &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &UINT64);
    assert_eq!(buffer.to_vec::<u64>().unwrap(), vec![u64::MAX]);

    let single = vec![
        HostValue::Typed(ScalarValue::Fp32(1.5)),
        HostValue::Typed(ScalarValue::Fp32(-2.0)),
    ];
    let (buffer, dtype) = marshal_value_buffer(&single, None, &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &FP32);
    assert_eq!(buffer.to_vec::<f32>().unwrap(), vec![1.5, -2.0]);

    let narrow = vec![HostValue::Typed(ScalarValue::Int32(7))];
    let (_, dtype) = marshal_value_buffer(&narrow, None, &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &INT32);
}

#[test]
fn test_marshalled_buffer_huge_index_is_none() {
    let input = ints(&[1, 2, 3]);
    let (buffer, _) = marshal_value_buffer(&input, None, &MarshalOptions::default()).unwrap();
    assert_eq!(buffer.get(2), Some(ScalarValue::Int64(3)));
    assert_eq!(buffer.get(usize::MAX / 8), None);
}

#[test]
fn test_value_buffer_rejects_object_arrays() {
    let array = HostArray::objects(vec![HostValue::Int(1), HostValue::from("two")]);
    let err = marshal_value_buffer(&array, None, &MarshalOptions::default()).unwrap_err();
    assert!(matches!(err, GrblasError::InvalidValueType(ref msg) if msg.contains("object")));
}

#[test]
fn test_value_buffer_rejects_object_sequences() {
    let values = vec![HostValue::Float(1.0), HostValue::None];
    let err = marshal_value_buffer(&values, None, &MarshalOptions::default()).unwrap_err();
    assert!(matches!(err, GrblasError::InvalidValueType(_)));
}

#[test]
fn test_value_buffer_with_explicit_dtype() {
    let values = vec![HostValue::Int(1), HostValue::Float(2.5)];
    let (buffer, dtype) =
        marshal_value_buffer(&values, Some("FP32".into()), &MarshalOptions::default()).unwrap();
    assert_eq!(dtype, &FP32);
    assert_eq!(buffer.to_vec::<f32>().unwrap(), vec![1.0, 2.5]);

    let err = marshal_value_buffer(&values, Some("FP128".into()), &MarshalOptions::default())
        .unwrap_err();
    assert!(matches!(err, GrblasError::UnknownDtype(_)));
}

#[test]
fn test_value_buffer_explicit_dtype_still_rejects_strings() {
    let values = vec![HostValue::from("7")];
    let result = marshal_value_buffer(
        &values,
        Some(DtypeSpecifier::of::<i64>()),
        &MarshalOptions::default(),
    );
    assert!(matches!(result, Err(GrblasError::InvalidValueType(_))));
}

#[test]
fn test_value_buffer_fortran_order() {
    let array = HostArray::from_shape_vec(&[2, 3], vec![1i64, 2, 3, 4, 5, 6]).unwrap();
    let opts = MarshalOptions::default().with_order(Order::F);
    let (buffer, _) = marshal_value_buffer(&array, None, &opts).unwrap();
    assert!(buffer.is_owned());
    assert_eq!(buffer.order(), Order::F);
    assert_eq!(buffer.to_vec::<i64>().unwrap(), vec![1, 4, 2, 5, 3, 6]);
}

#[test]
fn test_one_dimensional_fortran_request_is_still_a_view() {
    let array = HostArray::from_vec(vec![1.5f64, 2.5]);
    let opts = MarshalOptions::default().with_order(Order::F);
    let (buffer, _) = marshal_value_buffer(&array, None, &opts).unwrap();
    assert!(!buffer.is_owned());
}

//==================================================================================
// resolve_shape
//==================================================================================

#[test]
fn test_resolve_shape_passthrough() {
    assert_eq!(resolve_shape(Some(4), Some(5), &[]).unwrap(), (4, 5));
}

#[test]
fn test_resolve_shape_from_first_2d_array() {
    let rows = HostArray::from_vec(vec![0u64, 1]);
    let m = HostArray::from_shape_vec(&[2, 3], vec![0i64; 6]).unwrap();
    let other = Array2::<f64>::zeros((9, 9));
    let arrays: [(&str, &dyn Shaped); 3] = [("rows", &rows), ("m", &m), ("other", &other)];
    let shape = resolve_shape(None, None, &arrays).unwrap();
    assert_eq!(shape, (2, 3));
}

#[test]
fn test_resolve_shape_fills_only_missing_dimension() {
    let m = Array2::<i64>::zeros((2, 3));
    let arrays: [(&str, &dyn Shaped); 1] = [("m", &m)];
    assert_eq!(resolve_shape(Some(10), None, &arrays).unwrap(), (10, 3));
    assert_eq!(resolve_shape(None, Some(10), &arrays).unwrap(), (2, 10));
}

#[test]
fn test_resolve_shape_unresolvable_names_candidates() {
    let rows = HostArray::from_vec(vec![0u64, 1]);
    let values = HostArray::from_vec(vec![1.0f64, 2.0]);
    let arrays: [(&str, &dyn Shaped); 2] = [("rows", &rows), ("values", &values)];
    let err = resolve_shape(None, Some(3), &arrays).unwrap_err();
    match err {
        GrblasError::ShapeUnresolvable { candidates } => {
            assert_eq!(candidates, vec!["rows".to_string(), "values".to_string()]);
        }
        other => panic!("Expected ShapeUnresolvable, got {:?}", other),
    }
    assert!(resolve_shape(None, None, &[]).is_err());
}
