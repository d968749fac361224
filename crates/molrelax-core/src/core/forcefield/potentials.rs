use super::params::UffParams;
use nalgebra::Point3;

/// Prefactor of the UFF bond and angle force constant expressions,
/// in kcal/(mol·Å³) per unit effective charge product.
pub(crate) const FORCE_CONSTANT_PREFACTOR: f64 = 664.12;

/// Scaling factor of the bond-order correction to the natural bond length.
const BOND_ORDER_LAMBDA: f64 = 0.1332;

/// Calculates the UFF natural (rest) bond length between two typed atoms.
///
/// The length is the sum of the two valence radii with a bond-order
/// correction `r_BO = -0.1332 (r_i + r_j) ln(n)` and an electronegativity
/// correction `r_EN = r_i r_j (sqrt(chi_i) - sqrt(chi_j))^2 /
/// (chi_i r_i + chi_j r_j)`.
///
/// # Arguments
///
/// * `pi`, `pj` - UFF parameters of the bonded atoms.
/// * `order` - Numeric bond order (1, 2, 3, or 4 for aromatic).
///
/// # Return
///
/// Returns the natural bond length in Angstroms.
#[inline]
pub fn natural_bond_length(pi: &UffParams, pj: &UffParams, order: f64) -> f64 {
    let r_sum = pi.r1 + pj.r1;
    let r_bo = -BOND_ORDER_LAMBDA * r_sum * order.ln();
    let chi_diff = pi.chi.sqrt() - pj.chi.sqrt();
    let r_en = pi.r1 * pj.r1 * chi_diff * chi_diff / (pi.chi * pi.r1 + pj.chi * pj.r1);
    r_sum + r_bo - r_en
}

/// Calculates the harmonic bond stretch force constant.
///
/// `k = 664.12 Z_i Z_j / r0^3`, in kcal/(mol·Å²).
#[inline]
pub fn bond_force_constant(pi: &UffParams, pj: &UffParams, r0: f64) -> f64 {
    FORCE_CONSTANT_PREFACTOR * pi.z1 * pj.z1 / (r0 * r0 * r0)
}

/// Calculates the UFF angle bend force constant for an i-j-k angle.
///
/// Uses the approximate leg lengths `r_ij = r_i + r_j`, `r_jk = r_j + r_k`
/// and the law-of-cosines distance `r_ik` at the natural angle:
///
/// `K = 664.12 Z_i Z_k / r_ik^5 * r_ij r_jk *
///      [3 r_ij r_jk (1 - cos^2(theta0)) - r_ik^2 cos(theta0)]`
///
/// # Arguments
///
/// * `pi`, `pj`, `pk` - UFF parameters of the flanking and central atoms.
/// * `theta0` - Natural angle of the central atom, in radians.
///
/// # Return
///
/// Returns the force constant in kcal/mol. May be negative for unusual
/// parameter combinations; callers skip terms with negligible magnitude.
#[inline]
pub fn angle_force_constant(pi: &UffParams, pj: &UffParams, pk: &UffParams, theta0: f64) -> f64 {
    let cos_theta0 = theta0.cos();
    let r_ij = pi.r1 + pj.r1;
    let r_jk = pj.r1 + pk.r1;
    let r_ik_sq = r_ij * r_ij + r_jk * r_jk - 2.0 * r_ij * r_jk * cos_theta0;
    let r_ik = r_ik_sq.max(0.01).sqrt();
    let r_ik5 = r_ik * r_ik * r_ik * r_ik * r_ik;

    let mut k = FORCE_CONSTANT_PREFACTOR * pi.z1 * pk.z1 / r_ik5;
    k *= r_ij * r_jk;
    k *= 3.0 * r_ij * r_jk * (1.0 - cos_theta0 * cos_theta0) - r_ik_sq * cos_theta0;
    k
}

/// Calculates the Lennard-Jones 12-6 potential energy for a nonbonded pair.
///
/// `E = D (rho^12 - 2 rho^6)` with `rho = x_ij / r`; the minimum sits at
/// `r = x_ij` with depth `-D`.
#[inline]
pub fn lennard_jones_12_6(dist: f64, x_ij: f64, d_ij: f64) -> f64 {
    let rho = x_ij / dist;
    let rho6 = rho * rho * rho * rho * rho * rho;
    let rho12 = rho6 * rho6;
    d_ij * (rho12 - 2.0 * rho6)
}

/// Radial derivative of [`lennard_jones_12_6`]: `dE/dr = 12 D (rho^6 - rho^12) / r`.
#[inline]
pub fn lennard_jones_12_6_deriv(dist: f64, x_ij: f64, d_ij: f64) -> f64 {
    let rho = x_ij / dist;
    let rho6 = rho * rho * rho * rho * rho * rho;
    let rho12 = rho6 * rho6;
    d_ij * 12.0 * (rho6 - rho12) / dist
}

/// Calculates the signed dihedral angle over four positions.
///
/// The angle is measured between the planes (p1, p2, p3) and (p2, p3, p4)
/// via their normals; the sign follows `n1 . b3`. Returns 0.0 when either
/// plane is degenerate (collinear atoms), which callers treat as a skipped
/// term.
pub fn signed_dihedral(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> f64 {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);

    let n1_norm = n1.norm();
    let n2_norm = n2.norm();
    if n1_norm < 1e-10 || n2_norm < 1e-10 {
        return 0.0;
    }

    let cos_phi = (n1.dot(&n2) / (n1_norm * n2_norm)).clamp(-1.0, 1.0);
    let phi = cos_phi.acos();

    if n1.dot(&b3) < 0.0 { -phi } else { phi }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn natural_bond_length_of_single_bond_skips_order_correction() {
        let c3 = params::get("C_3").unwrap();
        let r0 = natural_bond_length(c3, c3, 1.0);
        // ln(1) = 0, identical electronegativities cancel r_EN.
        assert!(f64_approx_equal(r0, 2.0 * c3.r1));
    }

    #[test]
    fn natural_bond_length_shrinks_with_bond_order() {
        let c2 = params::get("C_2").unwrap();
        let single = natural_bond_length(c2, c2, 1.0);
        let double = natural_bond_length(c2, c2, 2.0);
        let triple = natural_bond_length(c2, c2, 3.0);
        assert!(double < single);
        assert!(triple < double);
    }

    #[test]
    fn natural_bond_length_applies_electronegativity_correction() {
        let c3 = params::get("C_3").unwrap();
        let o3 = params::get("O_3").unwrap();
        let r0 = natural_bond_length(c3, o3, 1.0);
        assert!(r0 < c3.r1 + o3.r1);
    }

    #[test]
    fn bond_force_constant_scales_inversely_with_cubed_length() {
        let h = params::get("H_").unwrap();
        let k1 = bond_force_constant(h, h, 1.0);
        let k2 = bond_force_constant(h, h, 2.0);
        assert!(f64_approx_equal(k1 / k2, 8.0));
    }

    #[test]
    fn angle_force_constant_is_positive_for_water_angle() {
        let h = params::get("H_").unwrap();
        let o3 = params::get("O_3").unwrap();
        let k = angle_force_constant(h, o3, h, o3.theta0.to_radians());
        assert!(k > 0.0);
    }

    #[test]
    fn lennard_jones_minimum_sits_at_characteristic_distance() {
        let energy = lennard_jones_12_6(3.851, 3.851, 0.105);
        assert!(f64_approx_equal(energy, -0.105));
        let slope = lennard_jones_12_6_deriv(3.851, 3.851, 0.105);
        assert!(f64_approx_equal(slope, 0.0));
    }

    #[test]
    fn lennard_jones_deriv_matches_finite_difference() {
        let h = 1e-6;
        for dist in [3.0, 3.851, 5.0, 8.0] {
            let fd = (lennard_jones_12_6(dist + h, 3.851, 0.105)
                - lennard_jones_12_6(dist - h, 3.851, 0.105))
                / (2.0 * h);
            let analytic = lennard_jones_12_6_deriv(dist, 3.851, 0.105);
            assert!((fd - analytic).abs() < 1e-6, "dist = {dist}");
        }
    }

    #[test]
    fn signed_dihedral_measures_cis_and_trans() {
        let p1 = Point3::new(1.0, 1.0, 0.0);
        let p2 = Point3::new(1.0, 0.0, 0.0);
        let p3 = Point3::new(2.0, 0.0, 0.0);
        let trans = Point3::new(2.0, -1.0, 0.0);
        let cis = Point3::new(2.0, 1.0, 0.0);

        assert!(f64_approx_equal(
            signed_dihedral(&p1, &p2, &p3, &trans).abs(),
            std::f64::consts::PI
        ));
        assert!(f64_approx_equal(signed_dihedral(&p1, &p2, &p3, &cis), 0.0));
    }

    #[test]
    fn signed_dihedral_sign_flips_with_reflection() {
        let p1 = Point3::new(1.0, 1.0, 0.0);
        let p2 = Point3::new(1.0, 0.0, 0.0);
        let p3 = Point3::new(2.0, 0.0, 0.0);
        let above = Point3::new(2.0, -0.5, 0.5);
        let below = Point3::new(2.0, -0.5, -0.5);

        let phi_above = signed_dihedral(&p1, &p2, &p3, &above);
        let phi_below = signed_dihedral(&p1, &p2, &p3, &below);
        assert!(f64_approx_equal(phi_above, -phi_below));
        assert!(phi_above != 0.0);
    }

    #[test]
    fn signed_dihedral_of_collinear_chain_is_zero() {
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let p2 = Point3::new(1.0, 0.0, 0.0);
        let p3 = Point3::new(2.0, 0.0, 0.0);
        let p4 = Point3::new(3.0, 0.0, 0.0);
        assert_eq!(signed_dihedral(&p1, &p2, &p3, &p4), 0.0);
    }
}
