pub mod attendance_event;
pub mod drink;
pub mod employee;
pub mod food;
pub mod order;
pub mod order_item;
