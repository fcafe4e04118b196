pub mod libpctech;
