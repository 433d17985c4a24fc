use kerbol_trajectory::core::vector;
use kerbol_trajectory::ephemeris::{BodyId, KerbolSystem};
use kerbol_trajectory::transfer::{
    GridSearchError, GridSearchProblem, GridSearchResult, TimeRange, TransferDirection,
    TransferEndpoint, TransferError, approximate_time_of_flight, departure_hyperbola,
    ejection_capture_dv, excess_velocity, grid_search, grid_search_parallel, partition_rows,
    planetary_transfer, planetary_transfer_with_direction,
};
use test_case::test_case;

const PARKING_ALTITUDE: f64 = 100_000.0;

fn kerbin_duna_problem(n_grid_t1: usize, n_grid_tof: usize) -> GridSearchProblem {
    let system = KerbolSystem::standard();
    GridSearchProblem::new(
        BodyId::Kerbin,
        BodyId::Duna,
        TimeRange::new(0.0, 9.0e6),
        TimeRange::new(3.0e6, 1.0e7),
        n_grid_t1,
        n_grid_tof,
        system.body(BodyId::Kerbin).radius + PARKING_ALTITUDE,
    )
    .with_capture(system.body(BodyId::Duna).radius + 60_000.0)
}

fn assert_bitwise_equal(a: &GridSearchResult, b: &GridSearchResult) {
    assert_eq!(a.n_grid_t1, b.n_grid_t1);
    assert_eq!(a.n_grid_tof, b.n_grid_tof);
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a.t1), bits(&b.t1));
    assert_eq!(bits(&a.tof), bits(&b.tof));
    assert_eq!(bits(&a.ejection_dv), bits(&b.ejection_dv));
    assert_eq!(
        a.capture_dv.as_deref().map(bits),
        b.capture_dv.as_deref().map(bits)
    );
}

#[test]
fn hohmann_estimate_for_kerbin_to_duna() {
    let system = KerbolSystem::standard();
    let tof = approximate_time_of_flight(system, BodyId::Kerbin, BodyId::Duna).expect("tof");
    // roughly 300 Kerbin days
    assert!(tof > 6.0e6 && tof < 7.0e6, "tof = {tof}");
}

#[test]
fn kerbin_to_duna_transfer_is_valid() {
    let system = KerbolSystem::standard();
    let tof = approximate_time_of_flight(system, BodyId::Kerbin, BodyId::Duna).expect("tof");
    let transfer =
        planetary_transfer(system, BodyId::Kerbin, BodyId::Duna, 0.0, tof).expect("transfer");

    assert!(transfer.valid());
    assert_eq!(transfer.parent, BodyId::Kerbol);
    assert_eq!(transfer.direction, TransferDirection::Prograde);
    assert!((transfer.time_of_flight() - tof).abs() < 1e-6);

    let elements = transfer.elements().expect("elements");
    assert!(elements.is_elliptical());
    assert_eq!(elements.epoch, 0.0);

    let v_inf = excess_velocity(&transfer, TransferEndpoint::Departure).expect("v_inf");
    assert!(vector::norm(&v_inf).is_finite() && vector::norm(&v_inf) > 0.0);
}

#[test]
fn inverted_window_yields_an_invalid_transfer() {
    let system = KerbolSystem::standard();
    let transfer =
        planetary_transfer(system, BodyId::Kerbin, BodyId::Duna, 5.0e6, 1.0e6).expect("transfer");

    assert!(!transfer.valid());
    assert!(transfer.elements().is_none());
    assert!(matches!(
        excess_velocity(&transfer, TransferEndpoint::Arrival),
        Err(TransferError::InvalidTransfer { body1: BodyId::Kerbin, .. })
    ));
}

#[test]
fn bodies_without_common_parent_cannot_transfer() {
    let system = KerbolSystem::standard();
    let result = planetary_transfer_with_direction(
        system,
        BodyId::Mun,
        BodyId::Duna,
        0.0,
        1.0e6,
        TransferDirection::Retrograde,
    );
    assert!(matches!(
        result,
        Err(TransferError::NoCommonParent {
            body1: BodyId::Mun,
            body2: BodyId::Duna
        })
    ));
}

#[test]
fn ejection_from_rest_costs_escape_minus_circular_speed() {
    let kerbin = KerbolSystem::standard().body(BodyId::Kerbin);
    let r = kerbin.radius + PARKING_ALTITUDE;
    let circular = (kerbin.mu / r).sqrt();

    let dv = ejection_capture_dv(kerbin, &[0.0; 3], r);
    assert!((dv - (2f64.sqrt() - 1.0) * circular).abs() < 1e-9);

    let faster = ejection_capture_dv(kerbin, &[1_000.0, 0.0, 0.0], r);
    let same_speed = ejection_capture_dv(kerbin, &[0.0, 600.0, 800.0], r);
    assert!(faster > dv);
    assert!((faster - same_speed).abs() < 1e-9);
}

#[test]
fn departure_hyperbola_matches_excess_velocity() {
    let system = KerbolSystem::standard();
    let transfer =
        planetary_transfer(system, BodyId::Kerbin, BodyId::Duna, 1.0e6, 7.5e6).expect("transfer");
    let r = system.body(BodyId::Kerbin).radius + PARKING_ALTITUDE;
    let hyperbola = departure_hyperbola(system, &transfer, r).expect("hyperbola");

    let v_inf = vector::norm(&excess_velocity(&transfer, TransferEndpoint::Departure).unwrap());
    let mu = system.body(BodyId::Kerbin).mu;
    assert!(hyperbola.is_hyperbolic());
    assert_eq!(hyperbola.epoch, 1.0e6);
    assert!((hyperbola.eccentricity - (1.0 + r * v_inf * v_inf / mu)).abs() < 1e-8);
}

#[test]
fn grid_search_fills_row_major_cells() {
    let system = KerbolSystem::standard();
    let problem = kerbin_duna_problem(4, 3);
    let result = grid_search(system, &problem).expect("grid");

    assert_eq!(result.len(), 12);
    assert_eq!(
        result.t1,
        [0.0, 0.0, 0.0, 3.0e6, 3.0e6, 3.0e6, 6.0e6, 6.0e6, 6.0e6, 9.0e6, 9.0e6, 9.0e6]
    );
    assert_eq!(&result.tof[..3], &[3.0e6, 6.5e6, 1.0e7]);

    let cell = result.cell(2, 1).expect("cell");
    assert_eq!(cell.t1, 6.0e6);
    assert_eq!(cell.tof, 6.5e6);
    assert_eq!(cell.t2, 1.25e7);
    assert!(result.cell(4, 0).is_none());
    assert!(result.valid_cells().count() > 0);

    let best = result.min_total_cell().expect("valid cell");
    assert!(result
        .valid_cells()
        .all(|cell| cell.total_dv() >= best.total_dv()));
}

#[test]
fn grid_cells_match_single_transfers() {
    let system = KerbolSystem::standard();
    let problem = kerbin_duna_problem(4, 4);
    let result = grid_search(system, &problem).expect("grid");
    let capture_radius = problem.capture_periapsis_radius.expect("capture orbit");

    for cell in result.cells() {
        let transfer = planetary_transfer(system, BodyId::Kerbin, BodyId::Duna, cell.t1, cell.t2)
            .expect("transfer");
        assert_eq!(transfer.valid(), cell.valid(), "t1 = {}, tof = {}", cell.t1, cell.tof);
        if !cell.valid() {
            continue;
        }

        let departure = excess_velocity(&transfer, TransferEndpoint::Departure).unwrap();
        let ejection = ejection_capture_dv(
            system.body(BodyId::Kerbin),
            &departure,
            problem.departure_periapsis_radius,
        );
        let arrival = excess_velocity(&transfer, TransferEndpoint::Arrival).unwrap();
        let capture = ejection_capture_dv(system.body(BodyId::Duna), &arrival, capture_radius);
        assert!((cell.ejection_dv - ejection).abs() <= 1e-9 * ejection);
        assert!((cell.capture_dv.unwrap() - capture).abs() <= 1e-9 * capture);
    }
}

#[test]
fn grid_without_capture_reports_ejection_only() {
    let system = KerbolSystem::standard();
    let mut problem = kerbin_duna_problem(2, 2);
    problem.capture_periapsis_radius = None;
    let result = grid_search(system, &problem).expect("grid");

    assert!(result.capture_dv.is_none());
    assert!(result.cells().all(|cell| cell.capture_dv.is_none()));
}

#[test_case(6, 1 ; "single worker")]
#[test_case(6, 2 ; "even split")]
#[test_case(6, 4 ; "ragged split")]
#[test_case(7, 7 ; "one row per worker")]
fn parallel_grid_matches_sequential(n_grid_t1: usize, workers: usize) {
    let system = KerbolSystem::standard();
    let problem = kerbin_duna_problem(n_grid_t1, 5);

    let sequential = grid_search(system, &problem).expect("sequential");
    let parallel = grid_search_parallel(system, &problem, workers).expect("parallel");
    assert_bitwise_equal(&sequential, &parallel);
}

#[test_case(10, 3, &[4, 3, 3] ; "remainder goes first")]
#[test_case(8, 4, &[2, 2, 2, 2] ; "even")]
#[test_case(5, 5, &[1, 1, 1, 1, 1] ; "one each")]
fn partition_rows_covers_every_row(n: usize, workers: usize, sizes: &[usize]) {
    let ranges = partition_rows(n, workers);
    assert_eq!(ranges.iter().map(|r| r.len()).collect::<Vec<_>>(), sizes);
    assert_eq!(ranges.first().map(|r| r.start), Some(0));
    assert_eq!(ranges.last().map(|r| r.end), Some(n));
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
}

#[test_case(0 ; "no workers")]
#[test_case(7 ; "more workers than rows")]
fn invalid_worker_counts_are_rejected(workers: usize) {
    let system = KerbolSystem::standard();
    let problem = kerbin_duna_problem(6, 2);
    assert!(matches!(
        grid_search_parallel(system, &problem, workers),
        Err(GridSearchError::InvalidWorkerCount { n_grid_t1: 6, .. })
    ));
}

#[test]
fn malformed_problems_are_rejected() {
    let system = KerbolSystem::standard();

    let empty = kerbin_duna_problem(0, 3);
    assert!(matches!(
        grid_search(system, &empty),
        Err(GridSearchError::EmptyGrid { .. })
    ));

    let mut inverted = kerbin_duna_problem(3, 3);
    inverted.t1_range = TimeRange::new(5.0, 1.0);
    assert!(matches!(
        grid_search(system, &inverted),
        Err(GridSearchError::InvalidRange { axis: "departure", .. })
    ));

    let mut no_parent = kerbin_duna_problem(3, 3);
    no_parent.body1 = BodyId::Mun;
    assert!(matches!(
        grid_search(system, &no_parent),
        Err(GridSearchError::Transfer(TransferError::NoCommonParent { .. }))
    ));

    let bad_radius = kerbin_duna_problem(3, 3).with_capture(-1.0);
    assert!(matches!(
        grid_search(system, &bad_radius),
        Err(GridSearchError::InvalidPeriapsisRadius(_))
    ));
}

#[test]
fn non_positive_flight_times_produce_invalid_cells() {
    let system = KerbolSystem::standard();
    let mut problem = kerbin_duna_problem(2, 3);
    problem.tof_range = TimeRange::new(-1.0e6, 0.0);
    let result = grid_search(system, &problem).expect("grid");

    assert_eq!(result.valid_cells().count(), 0);
    assert!(result.min_ejection_cell().is_none());
    assert!(result.ejection_dv.iter().all(|dv| dv.is_nan()));
}
