pub mod daraja;
pub mod in_memory;
