mod backup_tests;
