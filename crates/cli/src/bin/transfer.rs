use anyhow::anyhow;
use clap::Parser;
use kerbol_cli::{find_body, init_tracing};
use kerbol_trajectory::core::time::seconds_to_days;
use kerbol_trajectory::core::vector;
use kerbol_trajectory::ephemeris::KerbolSystem;
use kerbol_trajectory::impulsive::hohmann;
use kerbol_trajectory::orbits::KeplerianElements;
use kerbol_trajectory::transfer::{
    TransferDirection, TransferEndpoint, approximate_time_of_flight, departure_hyperbola,
    ejection_capture_dv, excess_velocity, planetary_transfer_with_direction,
};

/// Evaluate a single ballistic transfer between two bodies orbiting the same parent.
#[derive(Parser, Debug)]
#[command(author, version, about = "Single patched-conic transfer estimate")]
struct Cli {
    /// Departure body name (case-insensitive)
    #[arg(long)]
    from: String,

    /// Destination body name (case-insensitive)
    #[arg(long)]
    to: String,

    /// Departure time (seconds of universal time)
    #[arg(long, default_value_t = 0.0)]
    depart: f64,

    /// Arrival time (seconds of universal time; defaults to the Hohmann estimate)
    #[arg(long)]
    arrive: Option<f64>,

    /// Parking orbit altitude at the departure body in metres
    #[arg(long, default_value_t = 100_000.0)]
    parking_altitude: f64,

    /// Capture orbit altitude at the destination in metres
    #[arg(long)]
    capture_altitude: Option<f64>,

    /// Solve the retrograde branch
    #[arg(long, default_value_t = false)]
    retrograde: bool,

    /// Print the Hohmann time-of-flight heuristic and exit
    #[arg(long, default_value_t = false)]
    estimate_hohmann: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let system = KerbolSystem::standard();

    let origin = find_body(system, &cli.from)?;
    let destination = find_body(system, &cli.to)?;
    let hohmann_tof = approximate_time_of_flight(system, origin.id, destination.id)?;

    if cli.estimate_hohmann {
        let parent = system
            .common_parent(origin.id, destination.id)
            .ok_or_else(|| anyhow!("{} and {} share no parent", origin.name(), destination.name()))?;
        let a1 = origin.orbit.map(|o| o.semi_major_axis).unwrap_or_default();
        let a2 = destination.orbit.map(|o| o.semi_major_axis).unwrap_or_default();
        let estimate = hohmann(a1, a2, parent.mu);
        println!(
            "Hohmann {} -> {} around {}",
            origin.name(),
            destination.name(),
            parent.name()
        );
        println!(
            "  time of flight: {:.0} s ({:.1} days)",
            hohmann_tof,
            seconds_to_days(hohmann_tof)
        );
        println!(
            "  circular-orbit dv: {:.1} + {:.1} = {:.1} m/s",
            estimate.dv1.abs(),
            estimate.dv2.abs(),
            estimate.dv_total
        );
        return Ok(());
    }

    let direction = if cli.retrograde {
        TransferDirection::Retrograde
    } else {
        TransferDirection::Prograde
    };
    let t1 = cli.depart;
    let t2 = cli.arrive.unwrap_or(t1 + hohmann_tof);
    let transfer =
        planetary_transfer_with_direction(system, origin.id, destination.id, t1, t2, direction)?;
    let Some(elements) = transfer.elements() else {
        return Err(anyhow!(
            "no {direction} transfer from {} at {t1} s to {} at {t2} s",
            origin.name(),
            destination.name()
        ));
    };

    println!(
        "{} -> {} ({direction}), t1 = {t1:.0} s, t2 = {t2:.0} s, tof = {:.1} days",
        origin.name(),
        destination.name(),
        seconds_to_days(t2 - t1)
    );
    print_elements("transfer orbit", elements);

    let parking_radius = origin.radius + cli.parking_altitude;
    let v_inf_departure = excess_velocity(&transfer, TransferEndpoint::Departure)?;
    let ejection = ejection_capture_dv(origin, &v_inf_departure, parking_radius);
    println!(
        "  departure v_inf: {:.1} m/s, ejection dv: {:.1} m/s",
        vector::norm(&v_inf_departure),
        ejection
    );
    let hyperbola = departure_hyperbola(system, &transfer, parking_radius)?;
    print_elements("escape hyperbola", &hyperbola);

    let v_inf_arrival = excess_velocity(&transfer, TransferEndpoint::Arrival)?;
    print!("  arrival v_inf: {:.1} m/s", vector::norm(&v_inf_arrival));
    match cli.capture_altitude {
        Some(altitude) => {
            let capture =
                ejection_capture_dv(destination, &v_inf_arrival, destination.radius + altitude);
            println!(", capture dv: {capture:.1} m/s");
            println!("  total dv: {:.1} m/s", ejection + capture);
        }
        None => println!(),
    }
    Ok(())
}

fn print_elements(label: &str, elements: &KeplerianElements) {
    println!(
        "  {label}: a = {:.4e} m, e = {:.5}, i = {:.3} deg, LAN = {:.3} deg, AoP = {:.3} deg, nu = {:.3} deg",
        elements.semi_major_axis,
        elements.eccentricity,
        elements.inclination.to_degrees(),
        elements.longitude_of_ascending_node.to_degrees(),
        elements.argument_of_periapsis.to_degrees(),
        elements.true_anomaly.to_degrees(),
    );
}
