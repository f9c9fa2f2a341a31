use std::error::Error;

use dvidmsg::{
    array::{LogicalType, TypedArray},
    codec::{decode_array, decode_ndarray, encode_array, encode_ndarray},
    dtype_registry,
    wire::{ArrayPayload, WireArray},
};
use ndarray::{Array2, ArrayD, IxDyn, ShapeBuilder};

fn volume<T>(shape: &[usize], f: impl Fn(usize) -> T) -> ArrayD<T> {
    let len = shape.iter().product();
    ArrayD::from_shape_vec(IxDyn(shape), (0..len).map(f).collect()).unwrap()
}

fn echo(message: &WireArray) -> Result<WireArray, Box<dyn Error>> {
    let json = serde_json::to_string(message)?;
    Ok(serde_json::from_str(&json)?)
}

#[test]
fn round_trip_every_registered_type() -> Result<(), Box<dyn Error>> {
    let shape = [3, 4, 5];
    let arrays: Vec<TypedArray> = vec![
        volume(&shape, |i| i as i8 - 30).into(),
        volume(&shape, |i| (i * 5) as u8).into(),
        volume(&shape, |i| i as i16 * -300).into(),
        volume(&shape, |i| u16::MAX - i as u16).into(),
        volume(&shape, |i| i as i32 * -70_000).into(),
        volume(&shape, |i| u32::MAX - i as u32).into(),
        volume(&shape, |i| i as i64 * -5_000_000_000).into(),
        volume(&shape, |i| u64::MAX - i as u64).into(),
        volume(&shape, |i| i as f32 * 0.25 - 3.0).into(),
        volume(&shape, |i| i as f64 / 7.0).into(),
    ];
    assert_eq!(arrays.len(), dtype_registry::entries().len());

    for array in arrays {
        let message = echo(&encode_array(&array, Some([10, -2, 0].as_slice()))?)?;
        let entry = dtype_registry::by_logical_type(array.logical_type())?;
        assert_eq!(message.description().datatype(), entry.tag());
        assert_eq!(message.payload().field(), entry.payload_field());
        assert_eq!(message.payload().len(), 60);

        let decoded = decode_array(&message)?;
        assert_eq!(decoded.origin(), &[10, -2, 0]);
        assert_eq!(decoded.array(), &array);
    }
    Ok(())
}

#[test]
fn round_trip_every_registered_type_edge_shapes() -> Result<(), Box<dyn Error>> {
    for shape in [vec![0], vec![0, 3], vec![3, 0], vec![1], vec![2, 3]] {
        let arrays: Vec<TypedArray> = vec![
            volume(&shape, |i| -(i as i8)).into(),
            volume(&shape, |i| u8::MAX - i as u8).into(),
            volume(&shape, |i| i16::MIN + i as i16).into(),
            volume(&shape, |i| u16::MAX - i as u16).into(),
            volume(&shape, |i| i32::MIN + i as i32).into(),
            volume(&shape, |i| u32::MAX - i as u32).into(),
            volume(&shape, |i| i64::MIN + i as i64).into(),
            volume(&shape, |i| u64::MAX - i as u64).into(),
            volume(&shape, |i| -(i as f32) - 0.5).into(),
            volume(&shape, |i| i as f64 * 1e300).into(),
        ];
        for array in arrays {
            let message = echo(&encode_array(&array, None)?)?;
            assert_eq!(message.payload().len(), shape.iter().product::<usize>());
            assert_eq!(message.description().bounds().shape()?, array.shape());

            let decoded = decode_array(&message)?;
            assert_eq!(decoded.origin(), vec![0; shape.len()].as_slice());
            assert_eq!(decoded.array(), &array);
        }
    }
    Ok(())
}

#[test]
fn round_trip_json_echo_is_stable() -> Result<(), Box<dyn Error>> {
    let array = volume(&[2, 3, 4], |i| i as u32 * 100_000_000);
    let message = encode_ndarray(&array.view(), None)?;
    let json = serde_json::to_string(&message)?;

    let decoded = decode_ndarray::<u32>(&serde_json::from_str(&json)?)?;
    assert_eq!(decoded.array(), &array);

    let json_again = serde_json::to_string(&encode_ndarray(&decoded.array().view(), None)?)?;
    assert_eq!(json, json_again);
    Ok(())
}

#[test]
fn round_trip_fortran_layout_input() -> Result<(), Box<dyn Error>> {
    let array = ArrayD::from_shape_vec(IxDyn(&[3, 2]).f(), vec![1u16, 2, 3, 4, 5, 6])?;
    let message = encode_ndarray(&array.view(), None)?;
    assert_eq!(message.payload().elements::<i16>(), Some(&[1i16, 2, 3, 4, 5, 6][..]));

    let decoded = decode_ndarray::<u16>(&message)?;
    assert_eq!(decoded.array(), &array);
    Ok(())
}

#[test]
fn round_trip_sliced_view() -> Result<(), Box<dyn Error>> {
    let array = Array2::from_shape_fn((6, 5), |(row, column)| (row * 5 + column) as i64);
    let view = array.slice(ndarray::s![1..5;2, 1..4]).into_dyn();
    let message = encode_ndarray(&view, Some([1, 1].as_slice()))?;
    assert_eq!(message.description().bounds().start(), &[1, 1]);
    assert_eq!(message.description().bounds().stop(), &[3, 4]);
    assert_eq!(
        message.payload().elements::<i64>(),
        Some(&[6i64, 16, 7, 17, 8, 18][..])
    );

    let decoded = decode_ndarray::<i64>(&message)?;
    assert_eq!(decoded.array(), &view.to_owned());
    Ok(())
}

#[test]
fn round_trip_special_floats() -> Result<(), Box<dyn Error>> {
    let values = [0.0f32, -0.0, f32::INFINITY, f32::NEG_INFINITY, f32::NAN, f32::MIN_POSITIVE];
    let array = ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec())?;
    // f32 travels as i32 bit patterns, so every value survives JSON
    let message = echo(&encode_ndarray(&array.view(), None)?)?;
    let decoded = decode_ndarray::<f32>(&message)?;
    for (a, b) in decoded.array().iter().zip(values.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    Ok(())
}

#[test]
fn wire_message_from_foreign_json() -> Result<(), Box<dyn Error>> {
    let json = r#"{
        "description": {
            "bounds": {"start": [5, 6], "stop": [7, 9]},
            "axisNames": ["y", "x"],
            "datatype": "u8"
        },
        "data8": [-1, 0, 1, 2, -128, 127]
    }"#;
    let message: WireArray = serde_json::from_str(json)?;
    assert!(matches!(message.payload(), ArrayPayload::Data8(_)));

    let decoded = decode_array(&message)?;
    assert_eq!(decoded.array().logical_type(), LogicalType::UInt8);
    assert_eq!(decoded.origin(), &[5, 6]);
    assert_eq!(decoded.axis_names(), &['y', 'x']);
    let array = decoded.into_parts().0.into_ndarray::<u8>()?;
    assert_eq!(
        array,
        ArrayD::from_shape_vec(IxDyn(&[2, 3]).f(), vec![255u8, 0, 1, 2, 128, 127])?
    );
    Ok(())
}

#[test]
fn wire_message_rejects_two_payloads() {
    let json = r#"{
        "description": {"bounds": {"start": [0], "stop": [1]}, "datatype": "i32"},
        "data8": [1],
        "data32": [1]
    }"#;
    assert!(serde_json::from_str::<WireArray>(json).is_err());
}
