pub mod d400_business_intelligence;
