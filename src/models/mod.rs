pub mod booking;
pub mod consent;
pub mod customer;
pub mod guest;
pub mod room;
pub mod session;

pub use booking::{
    stay_nights, AccompanyingGuest, Booking, BookingDetails, BookingRoom, BookingStatus,
    RoomAssignmentStatus,
};
pub use consent::{Consent, ConsentLog, ConsentLogStatus};
pub use customer::Customer;
pub use guest::{Guest, NewGuest};
pub use room::Room;
pub use session::{BookingInfo, DeliveryStatus, SessionStatus};
