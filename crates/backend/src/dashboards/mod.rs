pub mod d402_top_customers;
