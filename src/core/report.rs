//! Operational reporting - daily summaries, analytics over a date range,
//! load factors, gate utilization, the live flight map projection, the
//! turnaround board, admin overview, per-day metrics and loyalty totals.
//!
//! Everything here is read-only. Callers pass the reference date or instant.

use crate::{
    core::{
        booking::count_booked_seats,
        derive::{delay_minutes, is_delayed, load_factor, on_time_percentage},
        flight::{day_bounds, flights_on_date},
        passenger::require_passenger,
    },
    entities::{
        ActionType, AlertType, AuditLog, Booking, BookingStatus, Flight, FlightStatus, Gate,
        GateStatus, Staff, SystemAlert, audit_log, booking, flight, gate, staff, system_alert,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Cruise figures shown on the map. Positions are estimated from elapsed time
/// only, so these are fixed display values.
const CRUISE_ALTITUDE_FT: i32 = 35_000;
const CRUISE_SPEED_KMH: i32 = 850;
const TOP_ROUTES: usize = 10;

const TURNAROUND_ARRIVAL_HOURS: i64 = 2;
const TURNAROUND_DEPARTURE_HOURS: i64 = 4;
/// Standard turnaround sequence with planned minutes per task.
const TURNAROUND_TASKS: [(&str, u32); 8] = [
    ("Passenger Disembarkation", 20),
    ("Cabin Cleaning", 30),
    ("Catering Service", 15),
    ("Fuel Service", 25),
    ("Baggage Unloading", 20),
    ("Baggage Loading", 25),
    ("Safety Check", 15),
    ("Passenger Boarding", 30),
];

const RECENT_CHANGES: u64 = 10;
const RECENT_COMPLETED_FLIGHTS: u64 = 10;
/// Longest range accepted by [`system_metrics`].
pub const MAX_METRICS_DAYS: i64 = 366;

/// Departures for one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct OperationsSummary {
    pub date: NaiveDate,
    pub total_flights: u64,
    pub on_time_departures: u64,
    pub delayed: u64,
    pub cancelled: u64,
    pub on_time_percentage: f64,
    pub average_delay_minutes: f64,
    pub gate_utilization: f64,
}

/// Departed on time: an actual departure no later than scheduled.
fn departed_on_time(flight: &flight::Model) -> bool {
    flight.actual_departure.is_some() && !is_delayed(flight)
}

/// Counts a flight as delayed when it is marked delayed or left late.
fn counts_as_delayed(flight: &flight::Model) -> bool {
    flight.status == FlightStatus::Delayed || is_delayed(flight)
}

/// Mean delay over the flights that actually left late.
fn average_delay(flights: &[flight::Model]) -> f64 {
    let delays: Vec<i64> = flights
        .iter()
        .map(delay_minutes)
        .filter(|minutes| *minutes > 0)
        .collect();
    if delays.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = delays.iter().sum::<i64>() as f64 / delays.len() as f64;
    mean
}

/// Summary of every flight scheduled to depart on `date`.
pub async fn operations_summary(db: &DatabaseConnection, date: NaiveDate) -> Result<OperationsSummary> {
    let flights = flights_on_date(db, date).await?;
    let total_flights = u64::try_from(flights.len())?;
    let on_time_departures = u64::try_from(flights.iter().filter(|f| departed_on_time(f)).count())?;
    let delayed = u64::try_from(flights.iter().filter(|f| counts_as_delayed(f)).count())?;
    let cancelled = u64::try_from(
        flights
            .iter()
            .filter(|f| f.status == FlightStatus::Cancelled)
            .count(),
    )?;

    Ok(OperationsSummary {
        date,
        total_flights,
        on_time_departures,
        delayed,
        cancelled,
        on_time_percentage: on_time_percentage(total_flights, on_time_departures),
        average_delay_minutes: average_delay(&flights),
        gate_utilization: gate_utilization(db).await?,
    })
}

/// Occupied gates as a percentage of all gates.
pub async fn gate_utilization(db: &DatabaseConnection) -> Result<f64> {
    let total = Gate::find().count(db).await?;
    if total == 0 {
        return Ok(0.0);
    }
    let occupied = Gate::find()
        .filter(gate::Column::Status.eq(GateStatus::Occupied))
        .count(db)
        .await?;
    #[allow(clippy::cast_precision_loss)]
    let pct = (occupied as f64 / total as f64) * 100.0;
    Ok(pct)
}

/// Seat occupancy of one flight.
#[derive(Debug, Clone, Serialize)]
pub struct FlightLoad {
    pub flight_id: i64,
    pub flight_number: String,
    pub booked_seats: u64,
    pub total_seats: i32,
    pub load_factor: f64,
}

pub async fn flight_load(db: &DatabaseConnection, flight: &flight::Model) -> Result<FlightLoad> {
    let booked_seats = count_booked_seats(db, flight.id).await?;
    Ok(FlightLoad {
        flight_id: flight.id,
        flight_number: flight.flight_number.clone(),
        booked_seats,
        total_seats: flight.total_seats,
        load_factor: load_factor(booked_seats, flight.total_seats),
    })
}

/// Paid revenue over bookings made in the range.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueSummary {
    pub paid_bookings: u64,
    pub total_revenue: f64,
    pub average_ticket_price: f64,
}

/// Sums `total_amount` over paid bookings whose booking date falls between
/// `start` and `end`, both days included.
pub async fn revenue(db: &DatabaseConnection, start: NaiveDate, end: NaiveDate) -> Result<RevenueSummary> {
    let (from, _) = day_bounds(start);
    let (_, until) = day_bounds(end);
    let amounts: Vec<f64> = Booking::find()
        .select_only()
        .column(booking::Column::TotalAmount)
        .filter(booking::Column::PaymentStatus.eq(true))
        .filter(booking::Column::BookingDate.gte(from))
        .filter(booking::Column::BookingDate.lt(until))
        .into_tuple()
        .all(db)
        .await?;

    let paid_bookings = u64::try_from(amounts.len())?;
    let total_revenue: f64 = amounts.iter().sum();
    #[allow(clippy::cast_precision_loss)]
    let average_ticket_price = if amounts.is_empty() {
        0.0
    } else {
        total_revenue / amounts.len() as f64
    };
    Ok(RevenueSummary {
        paid_bookings,
        total_revenue,
        average_ticket_price,
    })
}

/// Flights and bookings on one city pair.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePerformance {
    pub departure_city: String,
    pub arrival_city: String,
    pub flight_count: u64,
    pub total_bookings: u64,
}

/// Analytics for flights departing between `start` and `end` inclusive.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_flights: u64,
    pub on_time_flights: u64,
    pub on_time_percentage: f64,
    pub revenue: RevenueSummary,
    pub average_load_factor: f64,
    pub routes: Vec<RoutePerformance>,
}

pub async fn analytics(db: &DatabaseConnection, start: NaiveDate, end: NaiveDate) -> Result<Analytics> {
    let (from, _) = day_bounds(start);
    let (_, until) = day_bounds(end);
    let flights = Flight::find()
        .filter(flight::Column::DepartureTime.gte(from))
        .filter(flight::Column::DepartureTime.lt(until))
        .order_by_asc(flight::Column::DepartureTime)
        .all(db)
        .await?;

    // Booked seats per flight in one grouped query.
    let booked: HashMap<i64, i64> = Booking::find()
        .select_only()
        .column(booking::Column::FlightId)
        .column_as(booking::Column::Id.count(), "booked")
        .filter(booking::Column::Status.is_in([BookingStatus::Confirmed, BookingStatus::CheckedIn]))
        .group_by(booking::Column::FlightId)
        .into_tuple::<(i64, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let total_flights = u64::try_from(flights.len())?;
    let on_time_flights = u64::try_from(flights.iter().filter(|f| departed_on_time(f)).count())?;

    let mut load_sum = 0.0;
    let mut routes: Vec<RoutePerformance> = Vec::new();
    for flight in &flights {
        let seats = u64::try_from(booked.get(&flight.id).copied().unwrap_or(0))?;
        load_sum += load_factor(seats, flight.total_seats);

        match routes.iter_mut().find(|r| {
            r.departure_city == flight.departure_city && r.arrival_city == flight.arrival_city
        }) {
            Some(route) => {
                route.flight_count += 1;
                route.total_bookings += seats;
            }
            None => routes.push(RoutePerformance {
                departure_city: flight.departure_city.clone(),
                arrival_city: flight.arrival_city.clone(),
                flight_count: 1,
                total_bookings: seats,
            }),
        }
    }
    routes.sort_by(|a, b| b.flight_count.cmp(&a.flight_count));
    routes.truncate(TOP_ROUTES);

    #[allow(clippy::cast_precision_loss)]
    let average_load_factor = if flights.is_empty() {
        0.0
    } else {
        load_sum / flights.len() as f64
    };

    Ok(Analytics {
        start_date: start,
        end_date: end,
        total_flights,
        on_time_flights,
        on_time_percentage: on_time_percentage(total_flights, on_time_flights),
        revenue: revenue(db, start, end).await?,
        average_load_factor,
        routes,
    })
}

/// Estimated position of an airborne flight.
#[derive(Debug, Clone, Serialize)]
pub struct FlightPosition {
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    /// Percent of the scheduled block time elapsed since actual departure
    pub progress: f64,
    pub altitude: i32,
    pub speed: i32,
    pub status: FlightStatus,
}

/// Percent of the scheduled duration elapsed since the actual departure,
/// capped at 100.
#[must_use]
pub fn estimate_progress(flight: &flight::Model, now: DateTime<Utc>) -> f64 {
    let Some(actual) = flight.actual_departure else {
        return 0.0;
    };
    let duration = (flight.arrival_time - flight.departure_time).num_seconds();
    if duration <= 0 {
        return 0.0;
    }
    let elapsed = (now - actual).num_seconds().max(0);
    #[allow(clippy::cast_precision_loss)]
    let fraction = (elapsed as f64 / duration as f64).min(1.0);
    fraction * 100.0
}

/// Departed flights still due to arrive, projected for the map.
pub async fn flight_map(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<Vec<FlightPosition>> {
    let flights = Flight::find()
        .filter(flight::Column::Status.eq(FlightStatus::Departed))
        .filter(flight::Column::ActualDeparture.is_not_null())
        .filter(flight::Column::ArrivalTime.gte(now))
        .order_by_asc(flight::Column::DepartureTime)
        .all(db)
        .await?;

    Ok(flights
        .into_iter()
        .map(|flight| FlightPosition {
            progress: estimate_progress(&flight, now),
            flight_number: flight.flight_number,
            departure_city: flight.departure_city,
            arrival_city: flight.arrival_city,
            altitude: CRUISE_ALTITUDE_FT,
            speed: CRUISE_SPEED_KMH,
            status: flight.status,
        })
        .collect())
}

/// One step of an aircraft turnaround.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TurnaroundTask {
    pub task: &'static str,
    pub duration_minutes: u32,
    pub status: &'static str,
}

/// Inbound and outbound flights for gate and ramp coordination.
#[derive(Debug, Clone, Serialize)]
pub struct TurnaroundBoard {
    /// Airborne or boarding flights due to arrive within two hours
    pub arriving: Vec<flight::Model>,
    /// Scheduled flights departing within four hours
    pub departing: Vec<flight::Model>,
    pub tasks: Vec<TurnaroundTask>,
    pub total_task_minutes: u32,
}

pub async fn turnaround_board(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<TurnaroundBoard> {
    let arriving = Flight::find()
        .filter(flight::Column::ArrivalTime.gte(now))
        .filter(flight::Column::ArrivalTime.lte(now + Duration::hours(TURNAROUND_ARRIVAL_HOURS)))
        .filter(flight::Column::Status.is_in([FlightStatus::Departed, FlightStatus::Boarding]))
        .order_by_asc(flight::Column::ArrivalTime)
        .all(db)
        .await?;
    let departing = Flight::find()
        .filter(flight::Column::DepartureTime.gte(now))
        .filter(
            flight::Column::DepartureTime.lte(now + Duration::hours(TURNAROUND_DEPARTURE_HOURS)),
        )
        .filter(flight::Column::Status.eq(FlightStatus::Scheduled))
        .order_by_asc(flight::Column::DepartureTime)
        .all(db)
        .await?;

    let tasks: Vec<TurnaroundTask> = TURNAROUND_TASKS
        .iter()
        .map(|&(task, duration_minutes)| TurnaroundTask {
            task,
            duration_minutes,
            status: "pending",
        })
        .collect();
    Ok(TurnaroundBoard {
        arriving,
        departing,
        total_task_minutes: tasks.iter().map(|t| t.duration_minutes).sum(),
        tasks,
    })
}

/// Health of the system over the last 24 hours.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub active_staff: u64,
    pub bookings_last_24h: u64,
    pub critical_alerts: u64,
    pub warning_alerts: u64,
    /// Create, update and delete entries, newest first
    pub recent_changes: Vec<audit_log::Model>,
}

async fn open_alerts(db: &DatabaseConnection, alert_type: AlertType) -> Result<u64> {
    SystemAlert::find()
        .filter(system_alert::Column::AlertType.eq(alert_type))
        .filter(system_alert::Column::IsResolved.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

pub async fn admin_overview(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<AdminOverview> {
    let since = now - Duration::hours(24);
    let active_staff = Staff::find()
        .filter(staff::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let bookings_last_24h = Booking::find()
        .filter(booking::Column::BookingDate.gte(since))
        .count(db)
        .await?;
    let recent_changes = AuditLog::find()
        .filter(audit_log::Column::ActionType.is_in([
            ActionType::Create,
            ActionType::Update,
            ActionType::Delete,
        ]))
        .filter(audit_log::Column::Timestamp.gte(since))
        .order_by_desc(audit_log::Column::Timestamp)
        .order_by_desc(audit_log::Column::Id)
        .limit(RECENT_CHANGES)
        .all(db)
        .await?;

    Ok(AdminOverview {
        active_staff,
        bookings_last_24h,
        critical_alerts: open_alerts(db, AlertType::Critical).await?,
        warning_alerts: open_alerts(db, AlertType::Warning).await?,
        recent_changes,
    })
}

/// Traffic and paid revenue for flights departing on one day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub total_flights: u64,
    /// Confirmed and checked-in bookings
    pub total_passengers: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DailyMetrics>,
    pub total_flights: u64,
    pub total_passengers: u64,
    pub total_revenue: f64,
}

/// One entry per day from `start` to `end` inclusive, days without flights
/// included. Bookings count toward their flight's departure day.
pub async fn system_metrics(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SystemMetrics> {
    if start > end {
        return Err(Error::validation(
            "start_date",
            "Start date must not be after end date",
        ));
    }
    if (end - start).num_days() >= MAX_METRICS_DAYS {
        return Err(Error::validation(
            "end_date",
            format!("Metrics cover at most {MAX_METRICS_DAYS} days"),
        ));
    }

    let mut days: BTreeMap<NaiveDate, DailyMetrics> = start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|date| {
            (
                date,
                DailyMetrics {
                    date,
                    total_flights: 0,
                    total_passengers: 0,
                    revenue: 0.0,
                },
            )
        })
        .collect();

    let (from, _) = day_bounds(start);
    let (_, until) = day_bounds(end);
    let flights = Flight::find()
        .filter(flight::Column::DepartureTime.gte(from))
        .filter(flight::Column::DepartureTime.lt(until))
        .all(db)
        .await?;
    let departure_day: HashMap<i64, NaiveDate> = flights
        .iter()
        .map(|f| (f.id, f.departure_time.date_naive()))
        .collect();
    for day in departure_day.values() {
        if let Some(entry) = days.get_mut(day) {
            entry.total_flights += 1;
        }
    }

    if !departure_day.is_empty() {
        let bookings = Booking::find()
            .filter(booking::Column::FlightId.is_in(departure_day.keys().copied()))
            .all(db)
            .await?;
        for booking in bookings {
            let Some(entry) = departure_day
                .get(&booking.flight_id)
                .and_then(|day| days.get_mut(day))
            else {
                continue;
            };
            if matches!(booking.status, BookingStatus::Confirmed | BookingStatus::CheckedIn) {
                entry.total_passengers += 1;
            }
            if booking.payment_status {
                entry.revenue += booking.total_amount;
            }
        }
    }

    let days: Vec<DailyMetrics> = days.into_values().collect();
    Ok(SystemMetrics {
        start_date: start,
        end_date: end,
        total_flights: days.iter().map(|d| d.total_flights).sum(),
        total_passengers: days.iter().map(|d| d.total_passengers).sum(),
        total_revenue: days.iter().map(|d| d.revenue).sum(),
        days,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedFlight {
    pub booking: booking::Model,
    pub flight: flight::Model,
}

/// Loyalty standing of one passenger.
#[derive(Debug, Clone, Serialize)]
pub struct LoyaltySummary {
    pub passenger_id: i64,
    pub completed_bookings: u64,
    /// Sum over every paid booking, completed or not
    pub total_spent: f64,
    /// Latest arrivals first
    pub recent_flights: Vec<CompletedFlight>,
}

pub async fn loyalty_summary(db: &DatabaseConnection, passenger_id: i64) -> Result<LoyaltySummary> {
    require_passenger(db, passenger_id).await?;

    let completed_bookings = Booking::find()
        .filter(booking::Column::PassengerId.eq(passenger_id))
        .filter(booking::Column::Status.eq(BookingStatus::Completed))
        .count(db)
        .await?;
    let paid: Vec<f64> = Booking::find()
        .select_only()
        .column(booking::Column::TotalAmount)
        .filter(booking::Column::PassengerId.eq(passenger_id))
        .filter(booking::Column::PaymentStatus.eq(true))
        .into_tuple()
        .all(db)
        .await?;
    let recent_flights = Booking::find()
        .find_also_related(Flight)
        .filter(booking::Column::PassengerId.eq(passenger_id))
        .filter(booking::Column::Status.eq(BookingStatus::Completed))
        .order_by_desc(flight::Column::ArrivalTime)
        .limit(RECENT_COMPLETED_FLIGHTS)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(booking, flight)| flight.map(|flight| CompletedFlight { booking, flight }))
        .collect();

    Ok(LoyaltySummary {
        passenger_id,
        completed_bookings,
        total_spent: paid.iter().sum(),
        recent_flights,
    })
}
