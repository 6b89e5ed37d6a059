mod grbl;
mod peripheral;
