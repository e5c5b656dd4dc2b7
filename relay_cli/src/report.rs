use comfy_table::{Table, presets::UTF8_FULL};
use relay_optimizer::{
    OptimizationResult, format_minutes, solver::schedule::VehicleItinerary,
};

pub fn print_route_sheets(result: &OptimizationResult) {
    for itinerary in &result.itineraries {
        println!("{} ({})", itinerary.vehicle, itinerary.driver);
        println!("{}", route_sheet(itinerary));
    }

    if !result.unassigned.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Unassigned stop", "Reason"]);

        for report in &result.unassigned {
            table.add_row(vec![report.stop.clone(), report.reason.to_string()]);
        }

        println!("{table}");
    }
}

fn route_sheet(itinerary: &VehicleItinerary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Stop", "Arrival", "Departure"]);

    table.add_row(vec![
        itinerary.depot.clone(),
        String::new(),
        format_minutes(itinerary.departure),
    ]);

    for entry in &itinerary.stops {
        table.add_row(vec![
            entry.label.clone(),
            format_minutes(entry.arrival),
            format_minutes(entry.departure),
        ]);
    }

    table.add_row(vec![
        itinerary.depot.clone(),
        format_minutes(itinerary.return_arrival),
        String::new(),
    ]);

    table
}
