//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod aircraft;
pub mod audit_log;
pub mod booking;
pub mod check_in;
pub mod crew_assignment;
pub mod flight;
pub mod gate;
pub mod passenger;
pub mod staff;
pub mod system_alert;

// Re-export specific types to avoid conflicts
pub use aircraft::{AircraftStatus, Entity as Aircraft, Model as AircraftModel};
pub use audit_log::{ActionType, Entity as AuditLog, Model as AuditLogModel};
pub use booking::{BookingStatus, Entity as Booking, Model as BookingModel, SeatClass};
pub use check_in::{CheckInMethod, CheckInStatus, Entity as CheckIn, Model as CheckInModel};
pub use crew_assignment::{
    AssignmentStatus, Entity as CrewAssignment, Model as CrewAssignmentModel,
};
pub use flight::{Entity as Flight, FlightStatus, Model as FlightModel};
pub use gate::{Entity as Gate, GateStatus, Model as GateModel};
pub use passenger::{Entity as Passenger, Model as PassengerModel};
pub use staff::{Entity as Staff, Model as StaffModel, StaffRole};
pub use system_alert::{AlertType, Entity as SystemAlert, Model as SystemAlertModel};
