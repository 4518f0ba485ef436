pub mod editing_buffer;
pub mod schedule_model;
pub mod shift_record;
pub mod staffing_logic;
pub mod time;
