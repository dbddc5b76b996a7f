pub mod synthetic_sheet;
