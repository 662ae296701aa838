mod openai_service_test;
