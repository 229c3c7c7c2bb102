use comfy_table::{Attribute, Cell, Color, Row, Table};
use pickup_core::models::{
    DayNote, EffectivePickupTime, Group, PickupException, PickupSource, StudentPickupData,
    WeeklySchedule,
};
use pickup_core::timefmt;

fn time_cell(time: Option<chrono::NaiveTime>) -> Cell {
    match time {
        Some(t) => Cell::new(timefmt::format_time_of_day(t)),
        None => Cell::new("no pickup").fg(Color::DarkGrey),
    }
}

pub fn display_effective_times(entries: &[EffectivePickupTime]) {
    if entries.is_empty() {
        println!("No students found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Student", "Date", "Day", "Pickup", "Source", "Reason / Note", "Day notes"]);

    for entry in entries {
        let mut row = Row::new();
        row.add_cell(Cell::new(entry.student_id));
        row.add_cell(Cell::new(timefmt::format_date(entry.date)));
        row.add_cell(Cell::new(&entry.weekday_name));

        let source = entry.source();
        row.add_cell(match (source, entry.pickup_time) {
            (PickupSource::Unscheduled, _) => Cell::new("-").fg(Color::DarkGrey),
            (_, time) => time_cell(time),
        });

        row.add_cell(match source {
            PickupSource::Exception => Cell::new(source).fg(Color::Yellow).add_attribute(Attribute::Bold),
            PickupSource::Schedule => Cell::new(source).fg(Color::Green),
            PickupSource::Unscheduled => Cell::new(source).fg(Color::DarkGrey),
        });

        let remark = if entry.is_exception {
            entry.reason.clone()
        } else {
            entry.notes.clone()
        };
        row.add_cell(Cell::new(remark.unwrap_or_default()));

        let day_notes: Vec<&str> = entry.day_notes.iter().map(|n| n.content.as_str()).collect();
        row.add_cell(Cell::new(day_notes.join("\n")));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_schedules(schedules: &[WeeklySchedule]) {
    if schedules.is_empty() {
        println!("No weekly schedule.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Day", "Pickup", "Notes"]);
    for schedule in schedules {
        let day = u32::try_from(schedule.weekday)
            .ok()
            .and_then(|w| timefmt::weekday_name(w).ok())
            .unwrap_or("?");
        table.add_row(vec![
            Cell::new(day),
            Cell::new(timefmt::format_time_of_day(schedule.pickup_time)),
            Cell::new(schedule.notes.as_deref().unwrap_or_default()),
        ]);
    }
    println!("{table}");
}

pub fn display_exceptions(exceptions: &[PickupException]) {
    if exceptions.is_empty() {
        println!("No exceptions.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Pickup", "Reason"]);
    for exception in exceptions {
        table.add_row(vec![
            Cell::new(exception.id),
            Cell::new(timefmt::format_date(exception.exception_date)),
            time_cell(exception.pickup_time),
            Cell::new(exception.reason.as_deref().unwrap_or_default()),
        ]);
    }
    println!("{table}");
}

pub fn display_notes(notes: &[DayNote]) {
    if notes.is_empty() {
        println!("No day notes.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Note"]);
    for note in notes {
        table.add_row(vec![
            Cell::new(note.id),
            Cell::new(timefmt::format_date(note.note_date)),
            Cell::new(&note.content),
        ]);
    }
    println!("{table}");
}

pub fn display_pickup_data(data: &StudentPickupData) {
    println!("Student {}", data.student_id);
    println!("\nWeekly schedule");
    display_schedules(&data.schedules);
    println!("\nExceptions");
    display_exceptions(&data.exceptions);
    println!("\nDay notes");
    display_notes(&data.notes);
}

pub fn display_groups(groups: &[Group]) {
    if groups.is_empty() {
        println!("No groups found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Created"]);
    for group in groups {
        table.add_row(vec![
            Cell::new(group.id),
            Cell::new(&group.name),
            Cell::new(group.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    println!("{table}");
}
