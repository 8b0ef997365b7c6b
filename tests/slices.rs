use lanewise::operators::{Associative, Binary, Unary};
use lanewise::slice::{
    lanewise_slices, par_lanewise_slices, par_reduce_slice, par_unary_slices, reduce_slice,
    unary_slices,
};
use lanewise::{Species, PARALLEL_THRESHOLD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_slices_of_every_tail_length() {
    let mut rng = StdRng::seed_from_u64(7);
    let species = Species::<i16>::S_256;
    for len in 0..(species.length() * 3) {
        let a: Vec<i16> = (0..len).map(|_| rng.random()).collect();
        let b: Vec<i16> = (0..len).map(|_| rng.random()).collect();
        let mut out = vec![0i16; len];
        lanewise_slices(species, Binary::Sub, &a, &b, &mut out).unwrap();
        for i in 0..len {
            assert_eq!(out[i], a[i].wrapping_sub(b[i]), "len {len}, index {i}");
        }
        let sum = reduce_slice(species, Associative::Add, &a).unwrap();
        let expected = a.iter().fold(0i16, |acc, &x| acc.wrapping_add(x));
        assert_eq!(sum, expected, "sum of {len} lanes");
    }
}

#[test]
fn test_parallel_helpers_on_large_input() {
    let mut rng = StdRng::seed_from_u64(11);
    let species = Species::<f32>::S_128;
    let n = PARALLEL_THRESHOLD * 2 + 3;
    let a: Vec<f32> = (0..n).map(|_| rng.random_range(0.0f32..100.0)).collect();
    let b: Vec<f32> = (0..n).map(|_| rng.random_range(1.0f32..100.0)).collect();

    let mut out = vec![0.0f32; n];
    par_lanewise_slices(species, Binary::Div, &a, &b, &mut out).unwrap();
    for i in (0..n).step_by(997) {
        assert_eq!(out[i], a[i] / b[i], "quotient at {i}");
    }

    let mut roots = vec![0.0f32; n];
    par_unary_slices(species, Unary::Sqrt, &a, &mut roots).unwrap();
    let mut sequential = vec![0.0f32; n];
    unary_slices(species, Unary::Sqrt, &a, &mut sequential).unwrap();
    assert_eq!(roots, sequential);

    let max = par_reduce_slice(species, Associative::Max, &a).unwrap();
    let expected = a.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    assert_eq!(max, expected);
}
