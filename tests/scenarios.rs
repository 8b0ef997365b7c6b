//! End-to-end walkthroughs of the public API on small, hand-checked inputs.

use lanewise::operators::{Associative, Comparison};
use lanewise::{ByteOrder, Species, Vector};

#[test]
fn test_broadcast_add_on_four_int_lanes() {
    let species = Species::<i32>::S_128;
    let v = species.from_values(&[1, 2, 3, 4]).unwrap();
    let sum = v.add_scalar(10).unwrap();
    assert_eq!(
        sum,
        species.from_values(&[11, 12, 13, 14]).unwrap(),
        "adding 10 to every lane"
    );
}

#[test]
fn test_masked_sum_of_nonzero_lanes() {
    let species = Species::<i32>::S_128;
    let v = species.from_values(&[5, 0, 7, 0]).unwrap();
    let mask = v.compare_scalar(Comparison::Ne, 0).unwrap();
    assert_eq!(mask.to_array(), vec![true, false, true, false]);
    assert_eq!(v.reduce_lanes_masked(Associative::Add, &mask).unwrap(), 12);
}

#[test]
fn test_little_endian_load_big_endian_store() {
    let species = Species::<i32>::S_64;
    let bytes = [1u8, 0, 0, 0, 2, 0, 0, 0];
    let v = Vector::from_byte_array(species, &bytes, 0, ByteOrder::LittleEndian).unwrap();
    assert_eq!(v.to_array(), vec![1, 2]);

    let mut out = [0u8; 8];
    v.into_byte_array(&mut out, 0, ByteOrder::BigEndian).unwrap();
    assert_eq!(out, [0, 0, 0, 1, 0, 0, 0, 2]);
}

#[test]
fn test_rearrange_with_explicit_shuffle() {
    let species = Species::<i32>::S_128;
    let shuffle = species.shuffle_from_values(&[2, 0, 1, 3]).unwrap();
    let v = species.from_values(&[10, 20, 30, 40]).unwrap();
    assert_eq!(v.rearrange(&shuffle).unwrap().to_array(), vec![30, 10, 20, 40]);
}

#[test]
fn test_operator_overloads_follow_lanewise() {
    let species = Species::<f64>::S_256;
    let a = species.from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    let b = species.broadcast(0.5);
    assert_eq!((&a + &b).to_array(), vec![1.5, 2.5, 3.5, 4.5]);
    assert_eq!((&a * &b).to_array(), vec![0.5, 1.0, 1.5, 2.0]);
    assert_eq!((-a.clone()).to_array(), vec![-1.0, -2.0, -3.0, -4.0]);
    assert_eq!((a - b).to_array(), vec![0.5, 1.5, 2.5, 3.5]);
}

#[test]
fn test_display_formats() {
    let species = Species::<i16>::S_64;
    let v = species.from_values(&[1, -2, 3, -4]).unwrap();
    println!("species {species}, vector {v}");
    assert_eq!(v.to_string(), "[1, -2, 3, -4]");
    let mask = v.compare_scalar(Comparison::Gt, 0).unwrap();
    assert_eq!(mask.to_string(), "Mask[T.T.]");
}
