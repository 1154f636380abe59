mod assignment;
mod route;
mod schedule;
mod ticket;

pub use assignment::Assignment;
pub use route::{Route, RouteBuilder, RouteError};
pub use schedule::{RouteSchedule, ScheduleError};
pub use ticket::{Priority, SearchWidening, Ticket, TicketBuilder};
