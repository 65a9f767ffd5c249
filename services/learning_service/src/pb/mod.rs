mod conversion;

tonic::include_proto!("learning_service");
