use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicUsize,
    Ordering
};

use approx::assert_abs_diff_eq;

use curvemorph::math::grid::{
    collapse_duplicates,
    linspace,
    sort_by_x
};
use curvemorph::morph::morph::{
    Morph,
    MorphCurves
};
use curvemorph::morph::morpherror::MorphError;
use curvemorph::morph::morphsqueeze::{
    MorphSqueeze,
    ResamplePolicy,
    SplineBoundary
};
use curvemorph::morph::morphwarning::MorphWarning;
use tracing::{
    span,
    Event,
    Level,
    Metadata,
    Subscriber
};

/// 只計算 WARN 等級事件的 subscriber
struct WarnCounter {
    warnings: Arc<AtomicUsize>,
}

impl Subscriber for WarnCounter {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _attributes: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }

    fn record(&self, _span: &span::Id, _values: &span::Record<'_>) {}

    fn record_follows_from(&self, _span: &span::Id, _follows: &span::Id) {}

    fn event(&self, event: &Event<'_>) {
        if *event.metadata().level() == Level::WARN {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _span: &span::Id) {}

    fn exit(&self, _span: &span::Id) {}
}

fn squeeze_polynomial(coefs: &[f64], x: f64) -> f64 {
    coefs
        .iter()
        .enumerate()
        .map(|(i, &a)| a * x.powi(i as i32))
        .sum()
}

fn squeezed_grid(coefs: &[f64], x: &[f64]) -> Vec<f64> {
    x.iter().map(|&v| v + squeeze_polynomial(coefs, v)).collect()
}

fn sine_curves(x_morph: &[f64], coefs: &[f64], x_target: &[f64]) -> MorphCurves {
    let y_morph = squeezed_grid(coefs, x_morph).iter().map(|v| v.sin()).collect();
    let y_target = x_target.iter().map(|v| v.sin()).collect();
    MorphCurves::new(x_morph.to_vec(), y_morph, x_target.to_vec(), y_target)
}

#[test]
fn zero_squeeze_returns_inputs_unchanged() {
    let x = linspace(0.0, 10.0, 101);
    let curves = sine_curves(&x, &[0.3, 0.01], &x);

    for coefs in [vec![], vec![0.0], vec![0.0, 0.0, 0.0, 0.0]] {
        let mut morph = MorphSqueeze::new(coefs);
        let result = morph.morph(curves.clone()).unwrap();
        assert_eq!(result.curves(), &curves);
        assert_eq!(morph.state().input(), &curves);
        assert_eq!(morph.state().output(), Some(&curves));
        assert!(result.warnings().is_empty());
        assert_eq!(result.extrapolation().low(), None);
        assert_eq!(result.extrapolation().high(), None);
    }
}

#[test]
fn squeeze_recovers_unsqueezed_sine() {
    let coefs = [0.2, 0.01, 0.001];
    let x = linspace(0.0, 10.0, 101);
    let mut morph = MorphSqueeze::new(coefs.to_vec());
    let result = morph.morph(sine_curves(&x, &coefs, &x)).unwrap();

    let (x_morph_out, y_morph_out, x_target_out, y_target_out) = result.xyallout();
    assert_eq!(x_morph_out, x.as_slice());
    assert_eq!(x_target_out, x.as_slice());
    let expected: Vec<f64> = x.iter().map(|v| v.sin()).collect();
    assert_eq!(y_target_out, expected.as_slice());

    let interpolated = result.extrapolation().interpolated_range(x.len());
    assert!(interpolated.len() > 90);
    for i in interpolated {
        assert_abs_diff_eq!(y_morph_out[i], x[i].sin(), epsilon = 0.1);
    }
}

#[test]
fn round_trip_is_accurate_inside_interpolation_bounds() {
    let coefs = [0.2, 0.01, 0.001];
    let x = linspace(0.0, 10.0, 401);
    let mut morph = MorphSqueeze::new(coefs.to_vec());
    let result = morph.morph(sine_curves(&x, &coefs, &x)).unwrap();
    let (_, y_morph_out, _, _) = result.xyallout();

    let interpolated = result.extrapolation().interpolated_range(x.len());
    for i in 0..x.len() {
        let tolerance = if interpolated.contains(&i) { 1e-6 } else { 1e-2 };
        assert_abs_diff_eq!(y_morph_out[i], x[i].sin(), epsilon = tolerance);
    }
}

#[test]
fn extrapolation_indices_and_warning() {
    let coefs = [0.2, 0.01, 0.001];
    let x = linspace(0.0, 10.0, 101);
    let mut morph = MorphSqueeze::new(coefs.to_vec());
    let result = morph.morph(sine_curves(&x, &coefs, &x)).unwrap();

    let x_squeezed = squeezed_grid(&coefs, &x);
    let x_min = x_squeezed.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x_squeezed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let expected_low = (0..x.len()).filter(|&i| x[i] < x_min).max();
    let expected_high = (0..x.len()).filter(|&i| x[i] > x_max).min();

    assert_eq!(result.extrapolation().low(), expected_low);
    assert_eq!(result.extrapolation().high(), expected_high);
    assert_eq!(expected_low, Some(1));
    assert_eq!(expected_high, None);
    assert_eq!(morph.state().extrapolation(), result.extrapolation());

    let extrapolation_warnings: Vec<&MorphWarning> =
        result.warnings().iter().filter(|w| w.is_extrapolation()).collect();
    assert_eq!(extrapolation_warnings.len(), 1);
    assert_eq!(
        extrapolation_warnings[0].to_string(),
        "Warning: points with grid value below 0.2 will be extrapolated."
    );
}

#[test]
fn extrapolation_on_both_sides() {
    // 負的常數項加上縮放，使 squeezed 網格落在原網格內側
    let coefs = [0.5, -0.2];
    let x = linspace(0.0, 10.0, 51);
    let mut morph = MorphSqueeze::new(coefs.to_vec());
    let result = morph.morph(sine_curves(&x, &coefs, &x)).unwrap();

    // x' = 0.5 + 0.8x ∈ [0.5, 8.5]
    let info = result.extrapolation();
    assert_eq!(info.low(), Some(2));
    assert_eq!(info.high(), Some(43));
    assert_eq!(info.cutoff_low(), Some(0.5));
    let cutoff_high = info.cutoff_high().unwrap();
    assert_abs_diff_eq!(cutoff_high, 8.5, epsilon = 1e-12);
    assert_eq!(
        info.warning().unwrap().to_string(),
        format!("Warning: points with grid value below 0.5 and above {cutoff_high} will be extrapolated.")
    );
}

fn folding_case() -> (Vec<f64>, [f64; 3]) {
    // x' = -0.5x + 0.15x^2，先下降後上升
    (linspace(0.0, 10.0, 101), [0.0, -1.5, 0.15])
}

#[test]
fn folding_grid_changes_direction() {
    let (x, coefs) = folding_case();
    let x_squeezed = squeezed_grid(&coefs, &x);
    let signs: Vec<f64> = x_squeezed.windows(2).map(|w| (w[1] - w[0]).signum()).collect();
    assert!(signs.iter().any(|&s| s < 0.0));
    assert!(signs.iter().any(|&s| s > 0.0));
}

#[test]
fn strict_mode_rejects_non_monotonic_grid() {
    let (x, coefs) = folding_case();
    let mut morph = MorphSqueeze::new(coefs.to_vec()).with_check_increase(true);
    let error = morph.morph(sine_curves(&x, &coefs, &x)).unwrap_err();

    assert_eq!(error, MorphError::Convergence);
    assert!(error.is_convergence_error());
    assert!(error.to_string().contains("no longer strictly increasing"));
    assert!(morph.state().output().is_none());
    assert_eq!(morph.state().input().x_morph, x);
}

#[test]
fn lenient_mode_sorts_and_warns_once() {
    let (x, coefs) = folding_case();
    let mut morph = MorphSqueeze::new(coefs.to_vec());
    let result = morph.morph(sine_curves(&x, &coefs, &x)).unwrap();

    let non_monotonic: Vec<&MorphWarning> =
        result.warnings().iter().filter(|w| w.is_non_monotonic()).collect();
    assert_eq!(non_monotonic.len(), 1);
    assert!(non_monotonic[0].to_string().contains("non-monotonically increasing grid"));

    let info = result.squeeze_info().unwrap();
    assert!(!info.monotonic);
    let regions = info.overlapping_regions.as_ref().unwrap();
    assert_eq!(regions.len(), 1);
    let (lo, hi) = regions[0];
    assert_eq!(hi, 0.0);
    assert_abs_diff_eq!(lo, -5.0 / 12.0, epsilon = 1e-3);

    let (_, y_morph_out, _, _) = result.xyallout();
    assert_eq!(y_morph_out.len(), x.len());
    assert!(y_morph_out.iter().all(|y| y.is_finite()));
}

#[test]
fn monotonic_squeeze_reports_monotonic_info() {
    let coefs = [0.1, 0.02];
    let x = linspace(0.0, 5.0, 51);
    let mut morph = MorphSqueeze::new(coefs.to_vec()).with_check_increase(true);
    let result = morph.morph(sine_curves(&x, &coefs, &x)).unwrap();
    let info = result.squeeze_info().unwrap();
    assert!(info.monotonic);
    assert!(info.overlapping_regions.is_none());
    assert!(result.warnings().iter().all(|w| !w.is_non_monotonic()));
}

#[test]
fn duplicates_collapse_to_independent_group_mean() {
    let x = [1.0, 2.0, 1.0, 3.0, 2.0, 1.0, 0.5];
    let y = [3.0, 8.0, 6.0, -1.0, 2.0, 0.0, 4.0];

    let (x_sorted, y_sorted) = sort_by_x(&x, &y);
    let (x_unique, y_mean) = collapse_duplicates(&x_sorted, &y_sorted);

    let mut groups: HashMap<u64, (f64, usize)> = HashMap::new();
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let entry = groups.entry(xi.to_bits()).or_insert((0.0, 0));
        entry.0 += yi;
        entry.1 += 1;
    }

    assert_eq!(x_unique, vec![0.5, 1.0, 2.0, 3.0]);
    assert_eq!(x_unique.len(), groups.len());
    for (xi, yi) in x_unique.iter().zip(y_mean.iter()) {
        let (sum, count) = groups[&xi.to_bits()];
        assert_abs_diff_eq!(*yi, sum / count as f64, epsilon = 1e-15);
    }
}

#[test]
fn target_overlap_policy_trims_to_intersection() {
    let coefs = [-0.2, -0.01, -0.001, -0.001];
    let x_target = linspace(-3.0, 25.0, 401);
    let x_morph = linspace(0.0, 10.0, 301);
    let mut morph = MorphSqueeze::new(coefs.to_vec()).with_resample_policy(ResamplePolicy::TargetOverlap);
    let result = morph.morph(sine_curves(&x_morph, &coefs, &x_target)).unwrap();

    let x_squeezed = squeezed_grid(&coefs, &x_morph);
    let x_min = x_target[0].max(x_squeezed[0]);
    let x_max = x_target[x_target.len() - 1].min(x_squeezed[x_squeezed.len() - 1]);
    let expected: Vec<f64> = x_target
        .iter()
        .copied()
        .filter(|&v| v >= x_min && v <= x_max)
        .collect();

    let (x_morph_out, y_morph_out, x_target_out, y_target_out) = result.xyallout();
    assert!(!expected.is_empty());
    assert_eq!(x_target_out, expected.as_slice());
    assert_eq!(x_morph_out, expected.as_slice());
    assert_eq!(y_morph_out.len(), expected.len());
    let y_expected: Vec<f64> = expected.iter().map(|v| v.sin()).collect();
    assert_eq!(y_target_out, y_expected.as_slice());

    // 重疊區內全為內插
    assert!(!result.extrapolation().is_extrapolated());
    assert!(result.warnings().is_empty());
    for (&xi, &yi) in x_morph_out.iter().zip(y_morph_out.iter()) {
        assert_abs_diff_eq!(yi, xi.sin(), epsilon = 1e-3);
    }
}

#[test]
fn natural_boundary_is_selectable() {
    let coefs = [0.2, 0.01, 0.001];
    let x = linspace(0.0, 10.0, 201);
    let mut morph = MorphSqueeze::new(coefs.to_vec()).with_spline_boundary(SplineBoundary::Natural);
    let result = morph.morph(sine_curves(&x, &coefs, &x)).unwrap();
    let (_, y_morph_out, _, _) = result.xyallout();

    // 自然邊界在端點附近較差，只比較中段
    for i in 40..160 {
        assert_abs_diff_eq!(y_morph_out[i], x[i].sin(), epsilon = 1e-4);
    }
}

#[test]
fn coefficients_can_be_updated_between_calls() {
    let x = linspace(0.0, 10.0, 101);
    let mut morph = MorphSqueeze::new(vec![0.0]);
    let curves = sine_curves(&x, &[0.2, 0.01, 0.001], &x);

    let first = morph.morph(curves.clone()).unwrap();
    assert_eq!(first.curves(), &curves);

    morph.set_squeeze(vec![0.2, 0.01, 0.001]);
    let second = morph.morph(curves).unwrap();
    assert_eq!(second.extrapolation().low(), Some(1));
    assert_eq!(morph.state().extrapolation().low(), Some(1));
    assert_eq!(second.warnings().len(), 1);

    let warnings = Arc::new(AtomicUsize::new(0));
    let counter = WarnCounter { warnings: Arc::clone(&warnings) };
    tracing::subscriber::with_default(counter, || second.log_warnings(morph.summary()));
    assert_eq!(warnings.load(Ordering::SeqCst), second.warnings().len());
}

#[test]
fn policies_can_be_switched_between_calls() {
    let x_morph = linspace(0.0, 4.0, 41);
    let y_morph: Vec<f64> = x_morph.iter().map(|v| (v + 0.5).cos()).collect();
    let x_target = linspace(-1.0, 6.0, 15);
    let y_target: Vec<f64> = x_target.iter().map(|v| v.cos()).collect();
    let curves = MorphCurves::new(x_morph.clone(), y_morph, x_target.clone(), y_target);

    let mut morph = MorphSqueeze::new(vec![0.5]);
    let on_morph_grid = morph.morph(curves.clone()).unwrap();
    assert_eq!(on_morph_grid.xyallout().0, x_morph.as_slice());
    assert_eq!(on_morph_grid.xyallout().2, x_target.as_slice());

    morph.set_resample_policy(ResamplePolicy::TargetOverlap);
    morph.set_spline_boundary(SplineBoundary::Natural);
    assert_eq!(morph.resample_policy(), ResamplePolicy::TargetOverlap);
    assert_eq!(morph.spline_boundary(), SplineBoundary::Natural);

    let on_target_grid = morph.morph(curves).unwrap();
    let (x_morph_out, y_morph_out, x_target_out, _) = on_target_grid.xyallout();
    assert_eq!(x_morph_out, x_target_out);
    assert_eq!(x_target_out.first(), Some(&0.5));
    assert_eq!(x_target_out.last(), Some(&4.5));
    for (&x, &y) in x_morph_out.iter().zip(y_morph_out.iter()) {
        assert_abs_diff_eq!(y, x.cos(), epsilon = 1e-2);
    }
}

#[test]
fn mismatched_shapes_are_rejected() {
    let mut morph = MorphSqueeze::new(vec![0.1]);
    let error = morph
        .morph(MorphCurves::new(vec![0.0, 1.0], vec![0.0], vec![0.0], vec![0.0]))
        .unwrap_err();
    assert!(matches!(error, MorphError::LengthMismatch { .. }));
    assert_eq!(error.exit_code(), 2);
}
