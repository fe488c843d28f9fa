pub mod fm;
pub mod sstv;
