//! Algebraic laws every species must satisfy, checked on random inputs.
//!
//! Inputs come from a seeded `StdRng` so failures reproduce.

use lanewise::lane::Lane;
use lanewise::operators::{Associative, Binary, Comparison, Ternary, Unary};
use lanewise::{LaneType, Mask, Species, Vector, VectorShape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x1a4e_5eed;
const ROUNDS: usize = 32;

fn random_ints<E: Lane>(rng: &mut StdRng, species: Species<E>) -> Vector<E> {
    let lanes: Vec<E> = (0..species.length())
        .map(|_| E::from_i64(rng.random_range(-100i64..100)))
        .collect();
    species.from_values(&lanes).unwrap()
}

fn random_mask<E: Lane>(rng: &mut StdRng, species: Species<E>) -> Mask<E> {
    let bits: Vec<bool> = (0..species.length()).map(|_| rng.random()).collect();
    Mask::from_values(species, &bits).unwrap()
}

fn check_species_identity<E: Lane>() {
    for &shape in VectorShape::ALL.iter() {
        let species = Species::<E>::of(shape);
        assert_eq!(
            species.length() * species.element_size(),
            species.vector_bit_size(),
            "{species}: lanes * lane bits must equal vector bits"
        );
        assert_eq!(species, species.with_shape(shape));
        assert_eq!(species.zero().species(), species);
    }
}

#[test]
fn test_species_identity_for_all_lane_types() {
    check_species_identity::<i8>();
    check_species_identity::<i16>();
    check_species_identity::<i32>();
    check_species_identity::<i64>();
    check_species_identity::<f32>();
    check_species_identity::<f64>();
}

#[test]
fn test_lane_counts_for_128_bits() {
    let expected = [
        (LaneType::Byte, 16),
        (LaneType::Short, 8),
        (LaneType::Int, 4),
        (LaneType::Long, 2),
        (LaneType::Float, 4),
        (LaneType::Double, 2),
    ];
    for (lane_type, lanes) in expected {
        assert_eq!(
            VectorShape::S128.lane_count(lane_type),
            lanes,
            "128-bit shape of {lane_type}"
        );
    }
}

fn check_blend_laws<E: Lane>(species: Species<E>) {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let a = random_ints(&mut rng, species);
        let b = random_ints(&mut rng, species);
        let m = random_mask(&mut rng, species);

        assert_eq!(a.blend(&b, &species.mask_all(false)).unwrap(), a);
        assert_eq!(a.blend(&b, &species.mask_all(true)).unwrap(), b);
        assert_eq!(a.blend(&a, &m).unwrap(), a);

        let blended = a.blend(&b, &m).unwrap();
        for i in 0..species.length() {
            let expected = if m.lane_is_set(i).unwrap() { b.lane(i).unwrap() } else { a.lane(i).unwrap() };
            assert_eq!(blended.lane(i).unwrap(), expected, "{species} lane {i}");
        }
    }
}

#[test]
fn test_blend_laws() {
    check_blend_laws(Species::<i8>::S_128);
    check_blend_laws(Species::<i32>::S_256);
    check_blend_laws(Species::<f64>::S_512);
}

fn check_masked_op_law<E: Lane>(species: Species<E>, ops: &[Binary]) {
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);
    for &op in ops {
        for _ in 0..ROUNDS {
            let a = random_ints(&mut rng, species);
            let mut b = random_ints(&mut rng, species);
            if op == Binary::Div {
                let zeros = b.compare_scalar(Comparison::Eq, E::zero()).unwrap();
                b = b.blend(&b.broadcast(E::one()), &zeros).unwrap();
            }
            let m = random_mask(&mut rng, species);
            let masked = a.lanewise_masked(op, &b, &m).unwrap();
            let composed = a.blend(&a.lanewise(op, &b).unwrap(), &m).unwrap();
            assert_eq!(masked, composed, "{op:?} on {species}");
        }
    }
}

#[test]
fn test_masked_op_equals_blend_of_full_op() {
    let int_ops = [
        Binary::Add,
        Binary::Sub,
        Binary::Mul,
        Binary::Min,
        Binary::Max,
        Binary::And,
        Binary::Or,
        Binary::Xor,
        Binary::Lshl,
        Binary::Ashr,
        Binary::Lshr,
        Binary::Rol,
        Binary::Ror,
        Binary::FirstNonzero,
        Binary::AndNot,
        Binary::Div,
    ];
    check_masked_op_law(Species::<i16>::S_128, &int_ops);
    check_masked_op_law(Species::<i64>::S_256, &int_ops);
    check_masked_op_law(
        Species::<f32>::S_256,
        &[
            Binary::Add,
            Binary::Sub,
            Binary::Mul,
            Binary::Div,
            Binary::Min,
            Binary::Max,
            Binary::FirstNonzero,
        ],
    );
}

#[test]
fn test_masked_fma_keeps_unset_lanes() {
    let species = Species::<f32>::S_128;
    let a = species.from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    let m = Mask::from_values(species, &[true, false, true, false]).unwrap();
    let result = a
        .lanewise_ternary_masked(Ternary::Fma, &a.broadcast(10.0), &a.broadcast(0.5), &m)
        .unwrap();
    assert_eq!(result.to_array(), vec![10.5, 2.0, 30.5, 4.0]);
}

#[test]
fn test_masked_scalar_op() {
    let species = Species::<i32>::S_128;
    let v = species.from_values(&[1, 2, 3, 4]).unwrap();
    let m = Mask::from_values(species, &[false, true, true, false]).unwrap();
    assert_eq!(
        v.lanewise_scalar_masked(Binary::Mul, 100, &m).unwrap().to_array(),
        vec![1, 200, 300, 4]
    );
    let zero = species.broadcast(0);
    assert!(
        v.lanewise_scalar_masked(Binary::Div, 0, &species.mask_all(false)).is_ok(),
        "no set lane divides"
    );
    assert!(zero.lanewise_scalar_masked(Binary::Div, 0, &m).is_err());
}

#[test]
fn test_masked_reduction_to_long() {
    let species = Species::<i8>::S_64;
    let v = species.from_values(&[100, 100, 1, 2, 3, 4, 5, 6]).unwrap();
    let m = species.index_in_range(0, 2).not();
    assert_eq!(v.reduce_lanes_to_long_masked(Associative::Add, &m).unwrap(), 21);
    assert_eq!(v.reduce_lanes_to_long(Associative::Add).unwrap(), -35, "unmasked sum wraps");
    assert_eq!(
        v.reduce_lanes_to_long_masked(Associative::Max, &species.mask_all(false)).unwrap(),
        i64::from(i8::MIN)
    );

    let doubles = Species::<f64>::S_128.from_values(&[1.5, 8.0]).unwrap();
    let first = Species::<f64>::S_128.index_in_range(0, 1);
    assert_eq!(
        doubles.reduce_lanes_to_long_masked(Associative::Add, &first).unwrap(),
        1.5f64.to_bits() as i64
    );
}

#[test]
fn test_masked_division_skips_unset_zero_divisors() {
    let species = Species::<i32>::S_128;
    let a = species.from_values(&[8, 9, 10, 11]).unwrap();
    let b = species.from_values(&[2, 0, 5, 0]).unwrap();
    let m = Mask::from_values(species, &[true, false, true, false]).unwrap();
    assert_eq!(
        a.lanewise_masked(Binary::Div, &b, &m).unwrap().to_array(),
        vec![4, 9, 2, 11]
    );
    assert!(a.lanewise(Binary::Div, &b).is_err(), "unmasked zero divisor");
}

fn check_array_round_trip<E: Lane>(rng: &mut StdRng) {
    for &shape in VectorShape::ALL.iter() {
        let species = Species::<E>::of(shape);
        let data: Vec<E> = (0..species.length() * 3)
            .map(|_| E::from_i64(rng.random_range(-100i64..100)))
            .collect();
        for offset in [0, 3, species.length() * 2] {
            let v = Vector::from_array(species, &data, offset).unwrap();
            let mut out = vec![E::zero(); data.len()];
            v.into_array(&mut out, offset).unwrap();
            assert_eq!(
                &out[offset..offset + species.length()],
                &data[offset..offset + species.length()],
                "{species} round trip at offset {offset}"
            );
            assert_eq!(out[..offset], vec![E::zero(); offset][..], "{species} prefix untouched");
        }
    }
}

#[test]
fn test_array_round_trip() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 2);
    check_array_round_trip::<i8>(&mut rng);
    check_array_round_trip::<i16>(&mut rng);
    check_array_round_trip::<i32>(&mut rng);
    check_array_round_trip::<i64>(&mut rng);
    check_array_round_trip::<f32>(&mut rng);
    check_array_round_trip::<f64>(&mut rng);
}

fn check_reduction_identities<E: Lane>(species: Species<E>, ops: &[Associative]) {
    let mut rng = StdRng::seed_from_u64(SEED ^ 3);
    let none = species.mask_all(false);
    for &op in ops {
        let v = random_ints(&mut rng, species);
        let identity = lanewise::vector::identity::<E>(op);
        assert_eq!(
            v.reduce_lanes_masked(op, &none).unwrap(),
            identity,
            "{op:?} identity on {species}"
        );
        let one_lane = species.index_in_range(0, 1);
        assert_eq!(
            v.reduce_lanes_masked(op, &one_lane).unwrap(),
            v.lane(0).unwrap(),
            "{op:?} of a single lane on {species}"
        );
    }
}

#[test]
fn test_reduction_identities() {
    let int_ops = [
        Associative::Add,
        Associative::Mul,
        Associative::Min,
        Associative::Max,
        Associative::And,
        Associative::Or,
        Associative::Xor,
        Associative::FirstNonzero,
    ];
    check_reduction_identities(Species::<i8>::S_64, &int_ops);
    check_reduction_identities(Species::<i32>::S_MAX, &int_ops);
    check_reduction_identities(
        Species::<f64>::S_256,
        &[Associative::Add, Associative::Mul, Associative::Min, Associative::Max],
    );
}

#[test]
fn test_shift_counts_are_masked_to_lane_width() {
    let species = Species::<i32>::S_128;
    let v = species.from_values(&[1, -1, 0x40, i32::MIN]).unwrap();
    for op in [Binary::Lshl, Binary::Ashr, Binary::Lshr, Binary::Rol, Binary::Ror] {
        let wide = v.lanewise_long(op, 35).unwrap();
        let narrow = v.lanewise_long(op, 3).unwrap();
        assert_eq!(wide, narrow, "{op:?} count 35 behaves as 3");
    }
    let bytes = Species::<i8>::S_64.broadcast(1);
    assert_eq!(bytes.lanewise_long(Binary::Lshl, 9).unwrap(), bytes.lanewise_long(Binary::Lshl, 1).unwrap());
}

#[test]
fn test_broadcast_long_rejects_lossy_values() {
    let species = Species::<i8>::S_64;
    assert!(species.broadcast_long(127).is_ok());
    assert!(species.broadcast_long(128).is_err());
    assert!(species.zero().lanewise_long(Binary::Add, 300).is_err());
}

#[test]
fn test_not_is_involution_and_zomo() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 4);
    let species = Species::<i16>::S_256;
    for _ in 0..ROUNDS {
        let v = random_ints(&mut rng, species);
        let twice = v.lanewise_unary(Unary::Not).unwrap().lanewise_unary(Unary::Not).unwrap();
        assert_eq!(twice, v);
        let zomo = v.lanewise_unary(Unary::Zomo).unwrap();
        let nonzero = v.compare_scalar(Comparison::Ne, 0).unwrap();
        for i in 0..species.length() {
            let expected = if nonzero.lane_is_set(i).unwrap() { -1 } else { 0 };
            assert_eq!(zomo.lane(i).unwrap(), expected);
        }
    }
}
