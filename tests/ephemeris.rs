use kerbol_trajectory::core::vector;
use kerbol_trajectory::ephemeris::{
    BodyId, EphemerisError, KerbolSystem, absolute_state, direct_state, orbit_locus,
    state_at_time, states_at_times,
};
use test_case::test_case;

fn assert_close(a: &[f64; 3], b: &[f64; 3], tol: f64) {
    let diff = vector::norm(&vector::sub(a, b));
    assert!(diff <= tol, "{a:?} vs {b:?} differ by {diff}");
}

#[test]
fn standard_system_lists_every_body_in_order() {
    let system = KerbolSystem::standard();
    assert_eq!(system.bodies().len(), 17);
    assert_eq!(system.root(), BodyId::Kerbol);
    for (body, id) in system.bodies().iter().zip(BodyId::ALL) {
        assert_eq!(body.id, id);
        assert_eq!(body.id.index(), id as usize);
    }
}

#[test]
fn only_the_root_lacks_an_orbit() {
    let system = KerbolSystem::standard();
    for body in system.bodies() {
        assert_eq!(body.parent.is_none(), body.orbit.is_none(), "{}", body.name());
        assert!(body.mu > 0.0 && body.radius > 0.0);
    }
}

#[test]
fn hierarchy_matches_stock_system() {
    let system = KerbolSystem::standard();
    let jool_moons: Vec<BodyId> = system
        .children(BodyId::Jool)
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(
        jool_moons,
        [BodyId::Laythe, BodyId::Vall, BodyId::Tylo, BodyId::Bop, BodyId::Pol]
    );
    assert_eq!(system.parent(BodyId::Ike).map(|b| b.id), Some(BodyId::Duna));
    assert!(system.parent(BodyId::Kerbol).is_none());
    assert_eq!(
        system.common_parent(BodyId::Kerbin, BodyId::Duna).map(|b| b.id),
        Some(BodyId::Kerbol)
    );
    assert!(system.common_parent(BodyId::Mun, BodyId::Duna).is_none());
}

#[test_case("kerbin", BodyId::Kerbin ; "lowercase")]
#[test_case("DUNA", BodyId::Duna ; "uppercase")]
#[test_case("  Eeloo ", BodyId::Eeloo ; "padded")]
fn body_lookup_ignores_case(name: &str, expected: BodyId) {
    let system = KerbolSystem::standard();
    assert_eq!(system.find(name).expect("known body").id, expected);
}

#[test]
fn unknown_body_names_are_rejected() {
    let system = KerbolSystem::standard();
    assert!(matches!(
        system.find("Earth"),
        Err(EphemerisError::UnknownBody(name)) if name == "Earth"
    ));
}

#[test]
fn body_serializes_and_displays_by_name() {
    assert_eq!(BodyId::Minmus.to_string(), "Minmus");
    assert_eq!(BodyId::Minmus.name(), "Minmus");
    let colour = KerbolSystem::standard().body(BodyId::Kerbin).colour_hex();
    assert_eq!(colour.len(), 7);
    assert!(colour.starts_with('#'));
}

#[test]
fn state_of_a_body_relative_to_itself_is_zero() {
    let system = KerbolSystem::standard();
    let state = state_at_time(system, 12_345.0, BodyId::Laythe, BodyId::Laythe);
    assert_eq!(state.position, [0.0; 3]);
    assert_eq!(state.velocity, [0.0; 3]);
    assert_eq!(state.time, 12_345.0);
}

#[test]
fn root_state_is_zero_at_any_time() {
    let system = KerbolSystem::standard();
    let state = direct_state(system, BodyId::Kerbol, 1.0e7);
    assert_eq!(state.position, [0.0; 3]);
}

#[test]
fn nested_states_sum_along_the_hierarchy() {
    let system = KerbolSystem::standard();
    let t = 2.5e6;
    let kerbin = state_at_time(system, t, BodyId::Kerbol, BodyId::Kerbin);
    let mun = state_at_time(system, t, BodyId::Kerbin, BodyId::Mun);
    let mun_from_kerbol = state_at_time(system, t, BodyId::Kerbol, BodyId::Mun);

    assert_close(
        &mun_from_kerbol.position,
        &vector::add(&kerbin.position, &mun.position),
        1e-3,
    );
    assert_close(
        &mun_from_kerbol.velocity,
        &vector::add(&kerbin.velocity, &mun.velocity),
        1e-9,
    );
}

#[test]
fn sibling_states_are_differences_of_absolute_states() {
    let system = KerbolSystem::standard();
    let t = 4.0e6;
    let kerbin = absolute_state(system, BodyId::Kerbin, t);
    let duna = absolute_state(system, BodyId::Duna, t);
    let relative = state_at_time(system, t, BodyId::Kerbin, BodyId::Duna);

    assert_close(&relative.position, &vector::sub(&duna.position, &kerbin.position), 1.0);
    let reverse = state_at_time(system, t, BodyId::Duna, BodyId::Kerbin);
    assert_close(&reverse.position, &vector::scale(&relative.position, -1.0), 1.0);
}

#[test]
fn kerbin_stays_on_its_circular_orbit() {
    let system = KerbolSystem::standard();
    let a = system
        .body(BodyId::Kerbin)
        .orbit
        .expect("kerbin orbit")
        .semi_major_axis;
    let times = [0.0, 1.0e6, 5.0e6, 9.2e6];
    for state in states_at_times(system, &times, BodyId::Kerbol, BodyId::Kerbin) {
        assert!((vector::norm(&state.position) - a).abs() < 1e-3 * a);
        assert!(state.position[2].abs() < 1.0);
    }
}

#[test]
fn orbit_locus_requires_an_orbit() {
    let system = KerbolSystem::standard();
    let locus = orbit_locus(system, BodyId::Duna, 90).expect("locus");
    assert_eq!(locus.len(), 90);
    assert!(matches!(
        orbit_locus(system, BodyId::Kerbol, 90),
        Err(EphemerisError::NoOrbit(BodyId::Kerbol))
    ));
}

#[test]
fn misordered_tables_are_rejected() {
    let mut bodies = KerbolSystem::standard().bodies().to_vec();
    bodies.swap(1, 2);
    assert!(matches!(
        KerbolSystem::from_bodies(bodies),
        Err(EphemerisError::MisorderedTable { index: 1, .. })
    ));

    let mut truncated = KerbolSystem::standard().bodies().to_vec();
    truncated.pop();
    assert!(matches!(
        KerbolSystem::from_bodies(truncated),
        Err(EphemerisError::IncompleteTable(16))
    ));
}

#[test]
fn tables_without_a_single_root_are_rejected() {
    let mut bodies = KerbolSystem::standard().bodies().to_vec();
    bodies[4].parent = None;
    assert!(matches!(
        KerbolSystem::from_bodies(bodies),
        Err(EphemerisError::InvalidRoot(2))
    ));
}

#[test]
fn cyclic_parent_chains_are_rejected() {
    let mut bodies = KerbolSystem::standard().bodies().to_vec();
    let mun = BodyId::Mun.index();
    let minmus = BodyId::Minmus.index();
    bodies[mun].parent = Some(BodyId::Minmus);
    bodies[minmus].parent = Some(BodyId::Mun);
    assert!(matches!(
        KerbolSystem::from_bodies(bodies),
        Err(EphemerisError::CyclicHierarchy(BodyId::Mun))
    ));
}

#[test]
fn library_reports_version() {
    assert!(!kerbol_trajectory::version().is_empty());
}
