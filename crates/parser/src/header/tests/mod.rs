mod fields;
mod location;
