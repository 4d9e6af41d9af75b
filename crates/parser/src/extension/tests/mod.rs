mod merge;
mod value;
