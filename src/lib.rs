pub mod libquiz;
