//! Scalar layer: dual-number Jacobians and gradient discarding.

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use plant_types::{
    DiscardGradient, Dual, RigidTransform, Scalar, autodiff_to_gradient_matrix,
    autodiff_to_value_matrix, cast_vector, initialize_autodiff,
    initialize_autodiff_given_gradient_matrix, rotation_about_axis,
};

// ============================================================================
// Differentiation
// ============================================================================

/// Test: values and Jacobian of a small vector function at x = 7, y = 9.
#[test]
fn jacobian_of_vector_function() {
    let xy = initialize_autodiff::<2>(&DVector::from_vec(vec![7.0, 9.0])).unwrap();
    let (x, y) = (xy[0], xy[1]);
    let f = DVector::from_vec(vec![
        x.cos() + x.sin() * x.cos() / y,
        x.sin() + y,
        x * x + y * y * y,
    ]);

    let (xv, yv) = (7.0_f64, 9.0_f64);
    let (s, c) = (xv.sin(), xv.cos());
    let values = autodiff_to_value_matrix(&f);
    let expected = DVector::from_vec(vec![c + s * c / yv, s + yv, 49.0 + 729.0]);
    assert_relative_eq!(values, expected, epsilon = 1e-10);

    let jac = autodiff_to_gradient_matrix(&f);
    assert_eq!(jac.shape(), (3, 2));
    let expected = DMatrix::from_row_slice(
        3,
        2,
        &[
            -s + (c * c - s * s) / yv,
            -s * c / (yv * yv),
            c,
            1.0,
            2.0 * xv,
            3.0 * yv * yv,
        ],
    );
    assert_relative_eq!(jac, expected, epsilon = 1e-10);
}

/// Test: plain values cast into any scalar carry zero gradients, and the
/// gradient matrix has one column per tracked derivative.
#[test]
fn cast_values_have_zero_gradients() {
    let v = DVector::from_vec(vec![1.5, -2.0, 0.25]);

    let d3: DVector<Dual<3>> = cast_vector(&v);
    let jac = autodiff_to_gradient_matrix(&d3);
    assert_eq!(jac.shape(), (3, 3));
    assert!(jac.iter().all(|&g| g == 0.0));
    assert_eq!(autodiff_to_value_matrix(&d3), v);

    let d0: DVector<Dual<0>> = cast_vector(&v);
    assert_eq!(autodiff_to_gradient_matrix(&d0).shape(), (3, 0));

    let plain: DVector<f64> = cast_vector(&v);
    assert_eq!(autodiff_to_gradient_matrix(&plain).shape(), (3, 0));
}

// ============================================================================
// Gradient discarding
// ============================================================================

/// Test: discarding returns the underlying value whatever the derivatives.
#[test]
fn discard_gradient_returns_values() {
    let x = Dual::<2>::new(3.5, nalgebra::SVector::<f64, 2>::new(4.0, -1.0));
    assert_eq!(x.discard_gradient(), 3.5);
    assert_eq!(2.25_f64.discard_gradient(), 2.25);

    let m = Matrix3::from_fn(|i, j| Dual::<2>::variable((i * 3 + j) as f64, (i + j) % 2));
    let plain = m.discard_gradient();
    assert_eq!(plain, Matrix3::from_fn(|i, j| (i * 3 + j) as f64));

    let theta = Dual::<1>::variable(0.4, 0);
    let x_ab = RigidTransform::new(
        rotation_about_axis(&Vector3::z(), theta),
        Vector3::new(theta, Dual::constant(2.0), theta * theta),
    );
    let stripped = x_ab.discard_gradient();
    let expected = RigidTransform::new(
        rotation_about_axis(&Vector3::z(), 0.4),
        Vector3::new(0.4, 2.0, 0.16),
    );
    assert_relative_eq!(stripped.rotation, expected.rotation, epsilon = 1e-15);
    assert_relative_eq!(stripped.translation, expected.translation, epsilon = 1e-15);
}

/// Test: zero-gradient discarding fails on any non-zero derivative beyond
/// the tolerance and names the offending magnitude.
#[test]
fn discard_zero_gradient_is_conditional() {
    let constant = Dual::<2>::constant(1.0);
    assert_eq!(constant.discard_zero_gradient().unwrap(), 1.0);

    let tiny = Dual::<2>::new(1.0, nalgebra::SVector::<f64, 2>::new(1e-12, 0.0));
    let err = tiny.discard_zero_gradient().unwrap_err();
    assert!(err.is_non_zero_gradient());
    assert_eq!(tiny.discard_zero_gradient_with_tolerance(1e-9).unwrap(), 1.0);

    let v: DVector<Dual<2>> = DVector::from_vec(vec![Dual::constant(1.0), Dual::variable(2.0, 1)]);
    let err = v.discard_zero_gradient().unwrap_err();
    assert!(err.to_string().contains("refusing to discard gradient"));

    // Plain values have nothing to lose.
    assert_eq!(4.0_f64.discard_zero_gradient().unwrap(), 4.0);
}

/// Test: seeding from an explicit gradient matrix, then discarding.
#[test]
fn given_gradient_matrix_round_trip() {
    let values = DVector::from_vec(vec![1.0, 2.0, 3.0]);

    let zeros = DMatrix::zeros(3, 2);
    let x = initialize_autodiff_given_gradient_matrix::<2>(&values, &zeros).unwrap();
    assert_eq!(x.discard_zero_gradient().unwrap(), values);

    let ones = DMatrix::from_element(3, 2, 1.0);
    let x = initialize_autodiff_given_gradient_matrix::<2>(&values, &ones).unwrap();
    assert!(x.discard_zero_gradient().is_err());
    assert_eq!(x.discard_zero_gradient_with_tolerance(2.0).unwrap(), values);
    assert_eq!(autodiff_to_gradient_matrix(&x), ones);

    let wrong = DMatrix::zeros(2, 2);
    assert!(initialize_autodiff_given_gradient_matrix::<2>(&values, &wrong).is_err());
}

/// Test: the scalar trait reports whether a type differentiates.
#[test]
fn scalar_type_flags() {
    assert!(!<f64 as Scalar>::DIFFERENTIABLE);
    assert!(<Dual<3> as Scalar>::DIFFERENTIABLE);
    assert_eq!(<Dual<3> as Scalar>::NUM_DERIVATIVES, 3);
    assert_eq!(<f64 as Scalar>::NAME, "f64");
}
